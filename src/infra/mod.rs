pub mod http_client;
pub mod openai_client;

pub use http_client::ReqwestHttp;
pub use openai_client::OpenAiClient;
