//! LLM 补全后端 - 业务能力层
//!
//! 只暴露"一段提示词换一段回复"这一能力。
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务（如 Groq、Azure 等）

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// LLM 补全调用错误
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("LLM API 调用失败 (模型: {model}): {message}")]
    ApiCallFailed { model: String, message: String },
    #[error("LLM 返回内容为空 (模型: {0})")]
    EmptyContent(String),
}

/// 文本补全能力的抽象
///
/// 流水线按单次调用消费补全能力，超时等行为交给具体实现；
/// 测试用假后端替换本 trait 即可。
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// 发送提示词，返回模型的原始文本回复
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// 基于 async-openai 的生产实现
pub struct OpenAiBackend {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiBackend {
    /// 创建新的后端
    ///
    /// API 密钥缺失在此处立刻失败，而不是等到第一次调用
    pub fn new(config: &Config) -> AppResult<Self> {
        if config.llm_api_key.is_empty() {
            return Err(AppError::missing_value("LLM_API_KEY"));
        }

        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Ok(Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            // 较低的温度保证分类结果稳定
            temperature: 0.3,
            max_tokens: 150,
        })
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("提示词长度: {} 字符", prompt.len());

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            CompletionError::ApiCallFailed {
                model: self.model_name.clone(),
                message: e.to_string(),
            }
        })?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| CompletionError::EmptyContent(self.model_name.clone()))?;

        Ok(content.trim().to_string())
    }
}
