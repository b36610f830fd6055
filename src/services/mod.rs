pub mod classifier;
pub mod llm_provider;
pub mod noise_filter;
pub mod ocr;
pub mod review;
pub mod text_parser;
pub mod validator;
pub mod vocabulary;
