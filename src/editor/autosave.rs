//! # 자동 저장
//!
//! 열린 세션마다 주기 작업 하나가 돌면서, 마지막 저장 이후 내용이 바뀌었을 때만
//! 문서를 갱신하고 버전을 하나 만듭니다. 수동 저장(`saveVersion`)도 같은 기준점을 갱신합니다.
//!
//! 작업은 세션이 닫히거나 세션이 메모리에서 사라지면 멈춥니다.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::session::{EditorSession, SharedSession};
use crate::error::AppError;
use crate::models::{DocumentVersion, NewVersion};
use crate::services::store::DocumentStore;

#[derive(Debug, Clone, Default)]
pub struct AutoSave {
    last_snapshot: Option<String>,
}

impl AutoSave {
    /// 세션을 열 때의 문서 내용을 기준점으로 둡니다.
    pub fn new(initial: Option<String>) -> Self {
        Self {
            last_snapshot: initial,
        }
    }

    pub fn is_dirty(&self, content: &str) -> bool {
        self.last_snapshot.as_deref() != Some(content)
    }

    pub fn mark(&mut self, content: &str) {
        self.last_snapshot = Some(content.to_string());
    }
}

/// 자동 저장 한 번. 바뀐 게 없으면 `None`.
pub async fn autosave_tick(
    session: &mut EditorSession,
    store: &dyn DocumentStore,
) -> Result<Option<DocumentVersion>, AppError> {
    let content = session.document_content();
    if !session.autosave.is_dirty(&content) {
        return Ok(None);
    }

    store
        .update_document(&session.document_id, &content, None)
        .await?
        .ok_or(AppError::NotFound)?;
    let version = store
        .save_version(&session.document_id, &content, &NewVersion::default())
        .await?;
    session.autosave.mark(&content);
    Ok(Some(version))
}

/// 세션의 자동 저장 작업을 시작합니다. 첫 저장은 한 주기 뒤입니다.
pub fn spawn_autosave(
    session: &SharedSession,
    store: Arc<dyn DocumentStore>,
    period: Duration,
) -> JoinHandle<()> {
    let weak = Arc::downgrade(session);
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let Some(shared) = weak.upgrade() else {
                break;
            };
            let mut session = shared.lock().await;
            if session.is_closed() {
                break;
            }
            match autosave_tick(&mut session, store.as_ref()).await {
                Ok(Some(version)) => tracing::info!(
                    document_id = %session.document_id,
                    version_number = version.version_number,
                    "Auto-saved"
                ),
                Ok(None) => {}
                // 다음 주기에 다시 시도됩니다. 큐에 쌓지는 않습니다.
                Err(err) => tracing::warn!(
                    document_id = %session.document_id,
                    "Auto-save failed: {}",
                    err
                ),
            }
        }
        tracing::debug!("Auto-save task stopped");
    })
}
