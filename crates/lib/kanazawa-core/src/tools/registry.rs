use std::fmt;

use kanazawa_store::schema::{
    TOOL_BUS_SCHEDULE,
    TOOL_GARBAGE_SCHEDULE,
    TOOL_TOURIST_SPOTS,
    TOOL_TRANSPORTATION,
};
use schemars::schema_for;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::params::{BusScheduleInput, GarbageScheduleInput, TouristSpotInput, TransportationInput};

/// Names of the registered tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    GarbageSchedule,
    TouristSpots,
    Transportation,
    BusSchedule,
}

impl ToolName {
    pub const ALL: [Self; 4] = [
        Self::GarbageSchedule,
        Self::TouristSpots,
        Self::Transportation,
        Self::BusSchedule,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GarbageSchedule => TOOL_GARBAGE_SCHEDULE,
            Self::TouristSpots => TOOL_TOURIST_SPOTS,
            Self::Transportation => TOOL_TRANSPORTATION,
            Self::BusSchedule => TOOL_BUS_SCHEDULE,
        }
    }

    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::GarbageSchedule => "地区コードと日付で収集ごみ種別を返す",
            Self::TouristSpots => "キーワードで観光スポットを検索",
            Self::Transportation => "交通情報を取得（バス停、駅など）",
            Self::BusSchedule => "時刻・路線名・停留所名でバスの発車時刻を検索",
        }
    }

    /// JSON Schema of the tool's parameter record.
    #[must_use]
    pub fn input_schema(self) -> Value {
        match self {
            Self::GarbageSchedule => schema_for!(GarbageScheduleInput).to_value(),
            Self::TouristSpots => schema_for!(TouristSpotInput).to_value(),
            Self::Transportation => schema_for!(TransportationInput).to_value(),
            Self::BusSchedule => schema_for!(BusScheduleInput).to_value(),
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalogue entry advertised to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "input_schema")]
    pub parameter_schema: Value,
}

impl From<ToolName> for ToolDescriptor {
    fn from(tool: ToolName) -> Self {
        Self {
            name: tool.as_str().to_string(),
            description: tool.description().to_string(),
            parameter_schema: tool.input_schema(),
        }
    }
}

/// Fixed tool catalogue, built once at startup.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    descriptors: Vec<ToolDescriptor>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptors: ToolName::ALL.into_iter().map(ToolDescriptor::from).collect(),
        }
    }

    #[must_use]
    pub fn list_tools(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    #[must_use]
    pub fn has_tool(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<ToolName> {
        ToolName::parse(name)
    }
}
