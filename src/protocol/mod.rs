pub mod request;
pub mod response;

pub use request::{
    AttributeFilterParams, AttributeMatchParams, ClientInfo, GraphArgs, InitializeParams,
    JsonRpcRequest, LoadGraphParams, ReadResourceParams, RpcId, ShortestPathParams,
    ToolCallParams,
};
pub use response::{
    JsonRpcError, JsonRpcResponse, McpError, McpErrorCode, McpErrorResponse, ToolResult,
    ToolResultContent,
};
