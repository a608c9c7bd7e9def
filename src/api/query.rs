//! Query endpoint handler

use axum::{
    extract::State,
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, info};
use uuid::Uuid;

use super::state::AppState;
use super::types::{ApiError, QueryRequest, QueryResponse, StreamDelta, StreamMeta};
use crate::infrastructure::services::StreamedAnswer;

/// POST /query
pub async fn handle_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Response, ApiError> {
    let request_id = Uuid::new_v4().to_string();

    info!(
        request_id = %request_id,
        stream = request.stream,
        "Processing query"
    );

    if request.query.trim().is_empty() {
        return Err(ApiError::bad_request("query must not be empty").with_param("query"));
    }

    if request.stream {
        let streamed = state
            .query_service
            .answer_stream(&request.query)
            .await
            .map_err(ApiError::from)?;

        return Ok(create_sse_response(streamed));
    }

    let answer = state
        .query_service
        .answer(&request.query)
        .await
        .map_err(ApiError::from)?;

    let aliases = state
        .query_service
        .topic_aliases(&answer.context.topic_id)
        .await
        .unwrap_or_default();

    Ok(Json(QueryResponse::from_answer(answer, aliases)).into_response())
}

/// Bridge a streamed answer onto SSE: one metadata event, then content
/// deltas, then a final `[DONE]` marker
fn create_sse_response(streamed: StreamedAnswer) -> Response {
    let (tx, rx) = tokio::sync::mpsc::channel::<Result<Event, std::convert::Infallible>>(32);

    let meta = StreamMeta {
        source: streamed.context.source,
        tier: streamed.context.tier,
        topic: streamed.context.topic_id.to_string(),
        matched_alias: streamed.context.matched_alias.clone(),
        similarity: streamed.context.similarity,
    };
    let mut stream = streamed.stream;

    tokio::spawn(async move {
        if let Ok(data) = serde_json::to_string(&meta) {
            let _ = tx.send(Ok(Event::default().data(data))).await;
        }

        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(delta) => {
                    let event = serde_json::to_string(&StreamDelta { delta })
                        .map(|data| Event::default().data(data));

                    match event {
                        Ok(event) => {
                            if tx.send(Ok(event)).await.is_err() {
                                return;
                            }
                        }
                        Err(e) => error!(error = %e, "failed to encode stream delta"),
                    }
                }
                Err(e) => {
                    error!(error = %e, "answer stream error");
                    break;
                }
            }
        }

        let _ = tx.send(Ok(Event::default().data("[DONE]"))).await;
    });

    Sse::new(ReceiverStream::new(rx))
        .keep_alive(axum::response::sse::KeepAlive::default())
        .into_response()
}
