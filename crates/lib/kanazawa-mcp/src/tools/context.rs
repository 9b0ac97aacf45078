use rmcp::{
    ErrorData,
    model::{CallToolResult, Content},
    tool,
    tool_router,
};

use crate::KanazawaMcp;

const HELP_TEXT: &str = r#"Examples:

- get_garbage_schedule {"area_code": "01", "date": "2024-01-15"}
- search_tourist_spots {"keyword": "兼六園", "limit": 3}
- get_transportation_info {"type": "train_station"}
- get_bus_schedule {"time_range": "15:00", "route_name": "材木"}

Results are JSON objects of the form {"data": {...}, "data_source": "..."}.
`data_source` names the tier that answered: the municipal open-data portal
(`open_data`), the local database (`local_db`), or built-in sample data
(`static`). Sample data is representative only; check official city notices
for authoritative schedules."#;

#[tool_router(router = tool_router_context, vis = "pub")]
impl KanazawaMcp {
    #[tool(description = "Usage examples and result format for the Kanazawa tools.")]
    async fn help(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::text(HELP_TEXT)]))
    }
}
