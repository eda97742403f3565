// Resume analysis: prompt construction, model reply parsing and the request pipeline.
// All model calls go through llm_client::ModelGateway — no direct Gemini calls here.

pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod prompt_builder;
pub mod prompts;
pub mod response_parser;
