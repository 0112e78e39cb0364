// Document generation: prompt building, provider calls, output cleanup,
// interview preparation and the HTTP handlers that tie them to the store
// and the renderer.
// All LLM calls go through llm_client; nothing here talks to the provider directly.

pub mod cleanup;
pub mod generator;
pub mod handlers;
pub mod interview;
pub mod keywords;
pub mod prompts;
