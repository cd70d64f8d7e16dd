pub mod ai_assistant;
pub mod ai_gateway;
pub mod invoices;
pub mod prompts;
