use kanazawa_core::tools::ToolName;
use kanazawa_core::tools::params::{
    BusScheduleInput,
    GarbageScheduleInput,
    TouristSpotInput,
    TransportationInput,
};
use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content, ErrorCode},
    tool,
    tool_router,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{KanazawaMcp, helpers};

#[tool_router(router = tool_router_lookup, vis = "pub")]
impl KanazawaMcp {
    #[tool(description = "地区コードと日付で収集ごみ種別を返す")]
    async fn get_garbage_schedule(
        &self,
        Parameters(params): Parameters<GarbageScheduleInput>,
    ) -> Result<CallToolResult, ErrorData> {
        self.run_tool(ToolName::GarbageSchedule, &params).await
    }

    #[tool(description = "キーワードで観光スポットを検索")]
    async fn search_tourist_spots(
        &self,
        Parameters(params): Parameters<TouristSpotInput>,
    ) -> Result<CallToolResult, ErrorData> {
        self.run_tool(ToolName::TouristSpots, &params).await
    }

    #[tool(description = "交通情報を取得（バス停、駅など）")]
    async fn get_transportation_info(
        &self,
        Parameters(params): Parameters<TransportationInput>,
    ) -> Result<CallToolResult, ErrorData> {
        self.run_tool(ToolName::Transportation, &params).await
    }

    #[tool(description = "時刻・路線名・停留所名でバスの発車時刻を検索")]
    async fn get_bus_schedule(
        &self,
        Parameters(params): Parameters<BusScheduleInput>,
    ) -> Result<CallToolResult, ErrorData> {
        self.run_tool(ToolName::BusSchedule, &params).await
    }
}

impl KanazawaMcp {
    /// Routes typed parameters back through the dispatcher so MCP calls share
    /// validation and the result cache with every other front end.
    async fn run_tool<P: Serialize>(
        &self,
        tool: ToolName,
        params: &P,
    ) -> Result<CallToolResult, ErrorData> {
        let params = to_object(params)?;
        let result = self
            .dispatcher
            .execute(tool.as_str(), &params)
            .await
            .map_err(|err| helpers::map_tool_err(&err))?;
        Ok(CallToolResult::success(vec![Content::json(result)?]))
    }
}

fn to_object<P: Serialize>(params: &P) -> Result<Map<String, Value>, ErrorData> {
    match serde_json::to_value(params) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(helpers::mcp_err(
            ErrorCode::INVALID_PARAMS,
            "tool parameters must be an object",
        )),
        Err(err) => Err(helpers::mcp_err(ErrorCode::INVALID_PARAMS, err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use kanazawa_core::cache::MemoryCacheStore;
    use kanazawa_core::sources::DataSourceChain;
    use kanazawa_core::tools::{ToolDispatcher, ToolRegistry};

    use super::*;

    fn server() -> KanazawaMcp {
        KanazawaMcp::new(ToolDispatcher::new(
            Arc::new(ToolRegistry::new()),
            Arc::new(MemoryCacheStore::new()),
            Arc::new(DataSourceChain::new()),
        ))
    }

    fn first_text(result: &CallToolResult) -> Value {
        let json = serde_json::to_value(result).expect("serialize tool result");
        let text = json["content"][0]["text"]
            .as_str()
            .expect("text content")
            .to_string();
        serde_json::from_str(&text).expect("content is json")
    }

    #[tokio::test]
    async fn garbage_tool_echoes_request_and_tags_source() {
        let result = server()
            .get_garbage_schedule(Parameters(GarbageScheduleInput {
                area_code: "01".to_string(),
                date: "2024-01-15".to_string(),
            }))
            .await
            .expect("tool succeeds");

        let body = first_text(&result);
        assert_eq!(body["data_source"], "static");
        assert_eq!(body["data"]["area_code"], "01");
        assert_eq!(body["data"]["date"], "2024-01-15");
    }

    #[tokio::test]
    async fn invalid_date_maps_to_invalid_params() {
        let err = server()
            .get_garbage_schedule(Parameters(GarbageScheduleInput {
                area_code: "01".to_string(),
                date: "tomorrow".to_string(),
            }))
            .await
            .expect_err("date must parse");

        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn bus_tool_filters_timetable() {
        let result = server()
            .get_bus_schedule(Parameters(BusScheduleInput {
                time_range: Some("16:00".to_string()),
                route_name: None,
                stop_name: Some("金沢駅".to_string()),
                limit: 10,
            }))
            .await
            .expect("tool succeeds");

        let body = first_text(&result);
        let departures = body["data"]["departures"].as_array().expect("departures");
        assert_eq!(departures.len(), 1);
        assert_eq!(departures[0]["departure_time"], "16:10");
    }

    #[test]
    fn router_exposes_every_tool() {
        let server = server();
        let mut names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        names.sort_unstable();
        assert_eq!(
            names,
            vec![
                "get_bus_schedule",
                "get_garbage_schedule",
                "get_transportation_info",
                "health",
                "help",
                "search_tourist_spots",
            ]
        );
    }
}
