use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::annotation::{
    AnnotationKey, AnnotationRecord, MaterialId, PageNumber, RecordId, UserId,
};
use crate::error::{AppError, AppResult};

use super::AnnotationStore;

/// Client for the `/materials/{id}/annotations` REST API.
///
/// The server scopes every request to the authenticated user, so the `user`
/// arguments only serve the local key; ownership is enforced remotely.
#[derive(Clone)]
pub struct HttpAnnotationStore {
    agent: ureq::Agent,
    base_url: String,
    auth_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateBody<'a> {
    annotation_objects: &'a str,
    page_number: PageNumber,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateBody<'a> {
    annotation_objects: &'a str,
}

impl HttpAnnotationStore {
    pub fn new(base_url: impl Into<String>, auth_token: Option<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token: auth_token.filter(|token| !token.is_empty()),
        }
    }

    fn collection_url(&self, material: MaterialId) -> String {
        format!("{}/materials/{material}/annotations", self.base_url)
    }

    fn record_url(&self, material: MaterialId, id: RecordId) -> String {
        format!("{}/{id}", self.collection_url(material))
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        let request = self
            .agent
            .request(method, url)
            .set("Accept", "application/json");
        match &self.auth_token {
            Some(token) => request.set("Authorization", &format!("Bearer {token}")),
            None => request,
        }
    }

    async fn blocking<T, F>(&self, operation: &'static str, call: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce(HttpAnnotationStore) -> AppResult<T> + Send + 'static,
    {
        let client = self.clone();
        tokio::task::spawn_blocking(move || call(client))
            .await
            .map_err(|err| AppError::persistence(operation, format!("worker failed: {err}")))?
    }
}

fn call(
    operation: &'static str,
    request: ureq::Request,
    body: Option<String>,
) -> AppResult<ureq::Response> {
    let result = match body {
        Some(body) => request
            .set("Content-Type", "application/json")
            .send_string(&body),
        None => request.call(),
    };
    result.map_err(|err| map_ureq_error(operation, err))
}

fn send<T: DeserializeOwned>(
    operation: &'static str,
    request: ureq::Request,
    body: Option<String>,
) -> AppResult<T> {
    let raw = call(operation, request, body)?
        .into_string()
        .map_err(|err| AppError::persistence(operation, format!("unreadable response: {err}")))?;
    serde_json::from_str::<T>(&raw)
        .map_err(|err| AppError::persistence(operation, format!("unexpected response: {err}")))
}

fn map_ureq_error(operation: &'static str, err: ureq::Error) -> AppError {
    match err {
        ureq::Error::Status(404, _) => {
            AppError::not_found(format!("{operation}: annotation or material does not exist"))
        }
        ureq::Error::Status(code, response) => {
            let detail = response.into_string().unwrap_or_default();
            AppError::persistence(operation, format!("server returned {code}: {detail}"))
        }
        ureq::Error::Transport(transport) => AppError::persistence(operation, transport.to_string()),
    }
}

fn encode<T: Serialize>(operation: &'static str, body: &T) -> AppResult<String> {
    serde_json::to_string(body)
        .map_err(|err| AppError::persistence(operation, format!("failed to encode body: {err}")))
}

impl AnnotationStore for HttpAnnotationStore {
    async fn list(
        &self,
        material: MaterialId,
        _user: UserId,
        page: Option<PageNumber>,
    ) -> AppResult<Vec<AnnotationRecord>> {
        self.blocking("fetch", move |client| {
            let mut request = client.request("GET", &client.collection_url(material));
            if let Some(page) = page {
                request = request.query("pageNumber", &page.to_string());
            }
            send("fetch", request, None)
        })
        .await
    }

    async fn save(&self, key: AnnotationKey, payload: String) -> AppResult<AnnotationRecord> {
        self.blocking("save", move |client| {
            let body = encode(
                "save",
                &CreateBody {
                    annotation_objects: &payload,
                    page_number: key.page,
                },
            )?;
            let request = client.request("POST", &client.collection_url(key.material));
            send("save", request, Some(body))
        })
        .await
    }

    async fn update(
        &self,
        material: MaterialId,
        _user: UserId,
        id: RecordId,
        payload: String,
    ) -> AppResult<AnnotationRecord> {
        self.blocking("update", move |client| {
            let body = encode(
                "update",
                &UpdateBody {
                    annotation_objects: &payload,
                },
            )?;
            let request = client.request("PUT", &client.record_url(material, id));
            send("update", request, Some(body))
        })
        .await
    }

    async fn delete(&self, material: MaterialId, _user: UserId, id: RecordId) -> AppResult<()> {
        // Any 2xx counts; the body may be empty.
        self.blocking("delete", move |client| {
            let request = client.request("DELETE", &client.record_url(material, id));
            call("delete", request, None).map(|_| ())
        })
        .await
    }
}
