use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::IndexError;
use crate::llm_client::check_response;

/// Page size for list calls; the provisioning threshold is far below it.
const LIST_LIMIT: u32 = 100;

/// Hosted vector index operations used by the provisioner.
/// No delete or update operation is needed.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Id of the index with this exact name, if one exists.
    async fn find_index(&self, name: &str) -> Result<Option<String>, IndexError>;

    async fn create_index(&self, name: &str) -> Result<String, IndexError>;

    /// Ids of the documents attached to the index.
    async fn list_documents(&self, index_id: &str) -> Result<Vec<String>, IndexError>;

    /// Uploads one text document and attaches it to the index.
    async fn upload_document(
        &self,
        index_id: &str,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<String, IndexError>;
}

#[derive(Debug, Deserialize)]
struct ListPage<T> {
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct VectorStore {
    id: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObjectId {
    id: String,
}

/// OpenAI vector stores and files API.
#[derive(Clone)]
pub struct OpenAiVectorIndex {
    http: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiVectorIndex {
    pub fn new(http: Client, api_key: String, base_url: &str) -> Self {
        Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", "assistants=v2")
    }
}

#[async_trait]
impl VectorIndex for OpenAiVectorIndex {
    async fn find_index(&self, name: &str) -> Result<Option<String>, IndexError> {
        let response = self
            .authorized(self.http.get(format!("{}/vector_stores", self.base_url)))
            .query(&[("limit", LIST_LIMIT)])
            .send()
            .await?;
        let page: ListPage<VectorStore> = check_response(response).await?.json().await?;
        Ok(page
            .data
            .into_iter()
            .find(|store| store.name.as_deref() == Some(name))
            .map(|store| store.id))
    }

    async fn create_index(&self, name: &str) -> Result<String, IndexError> {
        let response = self
            .authorized(self.http.post(format!("{}/vector_stores", self.base_url)))
            .json(&json!({ "name": name }))
            .send()
            .await?;
        let created: ObjectId = check_response(response).await?.json().await?;
        debug!("Created vector store {name} ({})", created.id);
        Ok(created.id)
    }

    async fn list_documents(&self, index_id: &str) -> Result<Vec<String>, IndexError> {
        let response = self
            .authorized(
                self.http
                    .get(format!("{}/vector_stores/{index_id}/files", self.base_url)),
            )
            .query(&[("limit", LIST_LIMIT)])
            .send()
            .await?;
        let page: ListPage<ObjectId> = check_response(response).await?.json().await?;
        Ok(page.data.into_iter().map(|f| f.id).collect())
    }

    async fn upload_document(
        &self,
        index_id: &str,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<String, IndexError> {
        let part = Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str("text/plain")?;
        let form = Form::new().text("purpose", "assistants").part("file", part);

        let response = self
            .authorized(self.http.post(format!("{}/files", self.base_url)))
            .multipart(form)
            .send()
            .await?;
        let file: ObjectId = check_response(response).await?.json().await?;

        let response = self
            .authorized(
                self.http
                    .post(format!("{}/vector_stores/{index_id}/files", self.base_url)),
            )
            .json(&json!({ "file_id": file.id }))
            .send()
            .await?;
        check_response(response).await?;
        debug!("Attached {file_name} to vector store {index_id} as {}", file.id);
        Ok(file.id)
    }
}
