//! # 명령 디스패처
//!
//! 툴바/단축키에서 온 명령 하나를 세션에 적용하고 결과(`Effect`)와 알림을 돌려줍니다.
//!
//! 에러 처리 규칙:
//! - 검증 에러(빈 찾을 말, 선택 없는 댓글 등)는 그 메시지를 그대로 알림으로 보여줍니다.
//! - 그 밖의 에러(편집 명령 실패, 저장소 실패)는 로그만 남기고 일반 실패 알림을 보여줍니다.
//! - 재시도나 되돌리기는 없습니다. 일부만 적용된 서식은 그대로 남습니다.
//!
//! 내용을 바꾸는 명령 뒤에는 페이지 넘침 검사를 합니다.

use serde::Serialize;

use super::command::{Command, FORMATTING_COMMANDS};
use super::comments::EMPTY_COMMENT_MESSAGE;
use super::dictation::DictationStatus;
use super::markup::{
    chart_markup, default_chart_data, parse_dimensions, table_markup, ChartPoint,
    MAX_TABLE_DIMENSION,
};
use super::session::{EditorSession, Panels};
use super::Notification;
use crate::error::AppError;
use crate::models::{Comment, Document, DocumentVersionSummary, NewVersion, Position};
use crate::services::export::{export_pdf, export_word, ExportFile};
use crate::services::store::DocumentStore;

pub const COMMAND_FAILED_MESSAGE: &str = "There was an error executing the command";

/// `replace` 명령 값의 구분자 (`"찾을말=>바꿀말"`)
pub const REPLACE_SEPARATOR: &str = "=>";

/// 명령을 실행할 때 필요한 바깥 의존성
pub struct DispatchContext<'a> {
    pub store: &'a dyn DocumentStore,
    pub user_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    None,
    Edited,
    Found {
        count: usize,
    },
    Replaced {
        count: usize,
    },
    Download {
        filename: &'static str,
        mime: &'static str,
        #[serde(skip)]
        bytes: Vec<u8>,
    },
    Print,
    Panels(Panels),
    DocumentSaved {
        document: Document,
    },
    VersionSaved {
        version: DocumentVersionSummary,
    },
    Dictation(DictationStatus),
    CommentAdded {
        comment: Comment,
    },
}

impl From<ExportFile> for Effect {
    fn from(file: ExportFile) -> Self {
        Effect::Download {
            filename: file.filename,
            mime: file.mime,
            bytes: file.bytes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DispatchOutcome {
    pub effect: Effect,
    pub notifications: Vec<Notification>,
    /// 페이지 넘침으로 새로 만든 페이지 id
    pub page_created: Option<String>,
}

impl DispatchOutcome {
    fn failed(notification: Notification) -> Self {
        Self {
            effect: Effect::None,
            notifications: vec![notification],
            page_created: None,
        }
    }
}

/// 명령 하나를 실행합니다. 실패해도 에러를 돌려주지 않고 알림으로 바꿉니다.
pub async fn dispatch(
    session: &mut EditorSession,
    ctx: &DispatchContext<'_>,
    name: &str,
    value: Option<&str>,
) -> DispatchOutcome {
    let command = Command::parse(name, value);
    tracing::debug!(command = name, document_id = %session.document_id, "Dispatching command");

    let edits = command.edits_content();
    match run(session, ctx, command).await {
        Ok((effect, notifications)) => {
            let page_created = if edits {
                session.check_overflow(None)
            } else {
                None
            };
            DispatchOutcome {
                effect,
                notifications,
                page_created,
            }
        }
        Err(AppError::Validation(message)) | Err(AppError::Conflict(message)) => {
            tracing::warn!(command = name, "Command rejected: {}", message);
            DispatchOutcome::failed(Notification::error("Error", message))
        }
        Err(err) => {
            tracing::error!(command = name, "Error executing command: {}", err);
            DispatchOutcome::failed(Notification::error("Error", COMMAND_FAILED_MESSAGE))
        }
    }
}

fn required(value: Option<String>, message: &str) -> Result<String, AppError> {
    value.ok_or_else(|| AppError::validation(message))
}

async fn run(
    session: &mut EditorSession,
    ctx: &DispatchContext<'_>,
    command: Command,
) -> Result<(Effect, Vec<Notification>), AppError> {
    let effect = match command {
        Command::Native { name, value } => {
            if !FORMATTING_COMMANDS.contains(&name.as_str()) {
                tracing::debug!(command = %name, "Forwarding to native editing command");
            }
            session.surface.apply_command(&name, value.as_deref())?;
            Effect::Edited
        }
        Command::Paste => {
            session.surface.apply_command("paste", None)?;
            Effect::Edited
        }
        Command::Find(needle) => {
            let needle = required(needle, "Please enter text to find")?;
            Effect::Found {
                count: find(session, &needle)?,
            }
        }
        Command::Replace(value) => {
            let value = required(value, "Please enter text to replace")?;
            let (needle, replacement) = value
                .split_once(REPLACE_SEPARATOR)
                .filter(|(needle, _)| !needle.is_empty())
                .ok_or_else(|| AppError::validation("Please enter text to replace"))?;
            Effect::Replaced {
                count: replace_all(session, needle, replacement)?,
            }
        }
        Command::InsertTable(size) => {
            let (rows, cols) = parse_dimensions(size.as_deref())
                .ok_or_else(|| {
                    AppError::validation(format!(
                        "Table size must look like 3x3, up to {}x{}",
                        MAX_TABLE_DIMENSION, MAX_TABLE_DIMENSION
                    ))
                })?;
            session.surface.insert_html(&table_markup(rows, cols))?;
            Effect::Edited
        }
        Command::InsertChart(data) => {
            let points = match data {
                Some(json) => serde_json::from_str::<Vec<ChartPoint>>(&json).map_err(|_| {
                    AppError::validation("Chart data must be a list of {name, value} points")
                })?,
                None => default_chart_data(),
            };
            let svg = chart_markup(&points)
                .ok_or_else(|| AppError::validation("Chart needs at least one numeric point"))?;
            session.surface.insert_html(&svg)?;
            Effect::Edited
        }
        Command::InsertImage(url) => {
            let url = required(url, "Please enter an image URL")?;
            session.surface.apply_command("insertImage", Some(&url))?;
            Effect::Edited
        }
        Command::CreateLink(url) => {
            let url = required(url, "Please enter a URL")?;
            session.surface.apply_command("createLink", Some(&url))?;
            Effect::Edited
        }
        Command::ExportPdf => {
            let content = session.document_content();
            export_pdf(session.rasterizer(), &content)?.into()
        }
        Command::ExportWord => export_word(&session.document_content()).into(),
        Command::Print => Effect::Print,
        Command::ToggleComments => {
            session.panels.comments = !session.panels.comments;
            if session.panels.comments {
                session.comments.load(ctx.store).await?;
            }
            Effect::Panels(session.panels)
        }
        Command::ToggleVersions => {
            session.panels.versions = !session.panels.versions;
            Effect::Panels(session.panels)
        }
        Command::Save => {
            let document = session.save_document(ctx.store).await?;
            return Ok((
                Effect::DocumentSaved { document },
                vec![Notification::info("Success", "Document saved successfully")],
            ));
        }
        Command::SaveVersion(name) => {
            let meta = name.map(NewVersion::named).unwrap_or_default();
            let version = session.save_version(ctx.store, &meta).await?;
            return Ok((
                Effect::VersionSaved {
                    version: (&version).into(),
                },
                vec![Notification::info("Success", "Version saved successfully")],
            ));
        }
        Command::StartDictation(language) => {
            session.dictation.start(language.as_deref())?;
            Effect::Dictation(session.dictation.status())
        }
        Command::StopDictation => {
            session.dictation.stop();
            Effect::Dictation(session.dictation.status())
        }
        Command::SetLanguage(language) => {
            let language = required(language, "Please choose a language")?;
            session.dictation.set_language(&language)?;
            Effect::Dictation(session.dictation.status())
        }
        Command::AddComment(text) => {
            let text = required(text, EMPTY_COMMENT_MESSAGE)?;
            let selected = session.surface.selected_text().to_string();
            let comment = session
                .comments
                .add(
                    ctx.store,
                    ctx.user_id,
                    &text,
                    &selected,
                    Position::default(),
                    None,
                )
                .await?;
            Effect::CommentAdded { comment }
        }
    };
    Ok((effect, Vec::new()))
}

/// 문서 전체에서 나온 횟수를 세고, 현재 페이지에 있으면 첫 위치를 선택합니다.
fn find(session: &mut EditorSession, needle: &str) -> Result<usize, AppError> {
    let count = session.document_content().matches(needle).count();
    let content = session.surface.content();
    if let Some(byte_start) = content.find(needle) {
        let start = content[..byte_start].chars().count();
        let end = start + needle.chars().count();
        session.surface.select(start..end)?;
    }
    Ok(count)
}

/// 모든 페이지에서 대소문자를 구분해 바꿉니다. 현재 페이지는 실행 취소 한 번으로 되돌릴 수 있습니다.
fn replace_all(
    session: &mut EditorSession,
    needle: &str,
    replacement: &str,
) -> Result<usize, AppError> {
    let current = session.paginator.current();
    let mut count = 0;

    for (index, page) in session.paginator.pages_mut().iter_mut().enumerate() {
        if index == current {
            continue;
        }
        let found = page.content.matches(needle).count();
        if found > 0 {
            page.content = page.content.replace(needle, replacement);
            count += found;
        }
    }

    let found = session.surface.content().matches(needle).count();
    if found > 0 {
        let replaced = session.surface.content().replace(needle, replacement);
        session.surface.apply_command("selectAll", None)?;
        session.surface.insert_html(&replaced)?;
        count += found;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::platform::{CommandError, EditingPlatform};
    use crate::editor::session::SessionSettings;
    use crate::editor::surface::HtmlSurface;
    use crate::editor::NotificationLevel;
    use crate::services::memory::MemoryStore;
    use std::ops::Range;
    use std::sync::{Arc, Mutex};

    /// 받은 명령을 기록만 하는 편집 표면. `"explode"`는 실패합니다.
    struct RecordingPlatform {
        log: Arc<Mutex<Vec<(String, Option<String>)>>>,
        content: String,
    }

    impl EditingPlatform for RecordingPlatform {
        fn apply_command(&mut self, name: &str, arg: Option<&str>) -> Result<(), CommandError> {
            self.log
                .lock()
                .unwrap()
                .push((name.to_string(), arg.map(str::to_string)));
            if name == "explode" {
                return Err(CommandError::Platform("boom".into()));
            }
            Ok(())
        }

        fn content(&self) -> &str {
            &self.content
        }

        fn set_content(&mut self, html: String) {
            self.content = html;
        }

        fn selection(&self) -> Option<Range<usize>> {
            None
        }

        fn select(&mut self, _range: Range<usize>) -> Result<(), CommandError> {
            Ok(())
        }

        fn selected_text(&self) -> &str {
            ""
        }

        fn clipboard(&self) -> Option<&str> {
            None
        }
    }

    async fn open(store: &MemoryStore, content: &str) -> EditorSession {
        let doc = store.save_document("u", content, None).await.unwrap();
        EditorSession::open(store, &doc.id, SessionSettings::default())
            .await
            .unwrap()
    }

    fn recording_session(log: Arc<Mutex<Vec<(String, Option<String>)>>>) -> EditorSession {
        let document = Document {
            id: "doc".into(),
            title: "t".into(),
            content: String::new(),
            user_id: "u".into(),
            created_at: String::new(),
            updated_at: String::new(),
        };
        let platform = RecordingPlatform {
            log,
            content: String::new(),
        };
        EditorSession::with_surface(&document, Box::new(platform), SessionSettings::default())
    }

    fn error_message(outcome: &DispatchOutcome) -> &str {
        assert!(matches!(outcome.effect, Effect::None));
        let notification = &outcome.notifications[0];
        assert_eq!(notification.level, NotificationLevel::Error);
        &notification.message
    }

    #[tokio::test]
    async fn unknown_commands_are_forwarded_with_their_value() {
        let store = MemoryStore::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut session = recording_session(log.clone());
        let ctx = DispatchContext { store: &store, user_id: "u" };

        dispatch(&mut session, &ctx, "hiliteColor", Some("yellow")).await;
        dispatch(&mut session, &ctx, "insertHorizontalRule", None).await;
        dispatch(&mut session, &ctx, "bold", None).await;

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                ("hiliteColor".to_string(), Some("yellow".to_string())),
                ("insertHorizontalRule".to_string(), None),
                ("bold".to_string(), None),
            ]
        );
    }

    #[tokio::test]
    async fn failing_command_reports_generic_error() {
        let store = MemoryStore::new();
        let mut session = recording_session(Arc::new(Mutex::new(Vec::new())));
        let ctx = DispatchContext { store: &store, user_id: "u" };

        let outcome = dispatch(&mut session, &ctx, "explode", None).await;
        assert_eq!(error_message(&outcome), COMMAND_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn insert_table_defaults_to_three_by_three() {
        let store = MemoryStore::new();
        let mut session = open(&store, "").await;
        let ctx = DispatchContext { store: &store, user_id: "u" };

        let outcome = dispatch(&mut session, &ctx, "insertTable", None).await;

        assert!(matches!(outcome.effect, Effect::Edited));
        let content = session.surface.content();
        assert_eq!(content.matches("<tr>").count(), 3);
        assert_eq!(content.matches("<td contenteditable=\"true\">").count(), 9);

        let outcome = dispatch(&mut session, &ctx, "insertTable", Some("0x2")).await;
        assert_eq!(
            error_message(&outcome),
            "Table size must look like 3x3, up to 100x100"
        );
    }

    #[tokio::test]
    async fn oversized_table_is_rejected_without_editing() {
        let store = MemoryStore::new();
        let mut session = open(&store, "<p>keep</p>").await;
        let ctx = DispatchContext { store: &store, user_id: "u" };

        let outcome = dispatch(&mut session, &ctx, "insertTable", Some("100000x100000")).await;

        assert_eq!(
            error_message(&outcome),
            "Table size must look like 3x3, up to 100x100"
        );
        assert_eq!(session.surface.content(), "<p>keep</p>");
        assert_eq!(session.paginator.pages().len(), 1);
    }

    #[tokio::test]
    async fn insert_chart_uses_sample_data() {
        let store = MemoryStore::new();
        let mut session = open(&store, "").await;
        let ctx = DispatchContext { store: &store, user_id: "u" };

        dispatch(&mut session, &ctx, "insertChart", None).await;
        assert_eq!(session.surface.content().matches("<circle").count(), 3);

        let outcome =
            dispatch(&mut session, &ctx, "insertChart", Some(r#"[{"name":"Q1","value":5}]"#)).await;
        assert!(matches!(outcome.effect, Effect::Edited));
        assert!(session.surface.content().contains(">Q1</text>"));
    }

    #[tokio::test]
    async fn find_requires_text_and_counts_matches() {
        let store = MemoryStore::new();
        let mut session = open(&store, "one two one").await;
        let ctx = DispatchContext { store: &store, user_id: "u" };

        let outcome = dispatch(&mut session, &ctx, "find", Some("")).await;
        assert_eq!(error_message(&outcome), "Please enter text to find");

        let outcome = dispatch(&mut session, &ctx, "find", Some("one")).await;
        assert!(matches!(outcome.effect, Effect::Found { count: 2 }));
        assert_eq!(session.surface.selected_text(), "one");
    }

    #[tokio::test]
    async fn replace_changes_every_occurrence_and_is_undoable() {
        let store = MemoryStore::new();
        let mut session = open(&store, "cat, Cat, cat").await;
        let ctx = DispatchContext { store: &store, user_id: "u" };

        let outcome = dispatch(&mut session, &ctx, "replace", Some("cat=>dog")).await;
        assert!(matches!(outcome.effect, Effect::Replaced { count: 2 }));
        assert_eq!(session.surface.content(), "dog, Cat, dog");

        dispatch(&mut session, &ctx, "undo", None).await;
        assert_eq!(session.surface.content(), "cat, Cat, cat");

        let outcome = dispatch(&mut session, &ctx, "replace", Some("=>x")).await;
        assert_eq!(error_message(&outcome), "Please enter text to replace");
    }

    #[tokio::test]
    async fn word_export_downloads_document_markup() {
        let store = MemoryStore::new();
        let mut session = open(&store, "<p>hi</p>").await;
        let ctx = DispatchContext { store: &store, user_id: "u" };

        let outcome = dispatch(&mut session, &ctx, "exportWord", None).await;
        match outcome.effect {
            Effect::Download { filename, mime, bytes } => {
                assert_eq!(filename, "document.doc");
                assert_eq!(mime, "application/msword");
                assert_eq!(bytes, b"<p>hi</p>");
            }
            other => panic!("unexpected effect {:?}", other),
        }
    }

    #[tokio::test]
    async fn pdf_export_without_snapshot_notifies() {
        let store = MemoryStore::new();
        let mut session = open(&store, "<p>hi</p>").await;
        let ctx = DispatchContext { store: &store, user_id: "u" };

        let outcome = dispatch(&mut session, &ctx, "exportPDF", None).await;
        assert!(error_message(&outcome).contains("snapshot"));
    }

    #[tokio::test]
    async fn panels_toggle() {
        let store = MemoryStore::new();
        let mut session = open(&store, "").await;
        let ctx = DispatchContext { store: &store, user_id: "u" };

        dispatch(&mut session, &ctx, "toggleComments", None).await;
        let outcome = dispatch(&mut session, &ctx, "toggleVersions", None).await;
        match outcome.effect {
            Effect::Panels(panels) => assert!(panels.comments && panels.versions),
            other => panic!("unexpected effect {:?}", other),
        }
    }

    #[tokio::test]
    async fn save_and_save_version_persist_current_content() {
        let store = MemoryStore::new();
        let mut session = open(&store, "a").await;
        let ctx = DispatchContext { store: &store, user_id: "u" };
        session.surface.insert_text("b").unwrap();

        let outcome = dispatch(&mut session, &ctx, "save", None).await;
        assert!(matches!(outcome.effect, Effect::DocumentSaved { ref document } if document.content == "ab"));
        assert_eq!(outcome.notifications[0].level, NotificationLevel::Info);

        let outcome = dispatch(&mut session, &ctx, "saveVersion", Some("Draft")).await;
        match outcome.effect {
            Effect::VersionSaved { version } => {
                assert_eq!(version.version_number, 1);
                assert_eq!(version.version_name.as_deref(), Some("Draft"));
            }
            other => panic!("unexpected effect {:?}", other),
        }
    }

    #[tokio::test]
    async fn backend_failure_reports_generic_error() {
        let store = MemoryStore::new();
        let mut session = open(&store, "a").await;
        let ctx = DispatchContext { store: &store, user_id: "u" };

        store.set_failing(true);
        let outcome = dispatch(&mut session, &ctx, "saveVersion", None).await;
        assert_eq!(error_message(&outcome), COMMAND_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn add_comment_needs_a_selection() {
        let store = MemoryStore::new();
        let mut session = open(&store, "hello world").await;
        let ctx = DispatchContext { store: &store, user_id: "u" };

        let outcome = dispatch(&mut session, &ctx, "addComment", Some("nice")).await;
        assert_eq!(error_message(&outcome), EMPTY_COMMENT_MESSAGE);

        session.surface.select(6..11).unwrap();
        let outcome = dispatch(&mut session, &ctx, "addComment", Some("nice")).await;
        match outcome.effect {
            Effect::CommentAdded { comment } => {
                assert_eq!(comment.selected_text, "world");
                assert_eq!(comment.user_id, "u");
            }
            other => panic!("unexpected effect {:?}", other),
        }
    }

    #[tokio::test]
    async fn dictation_commands() {
        let store = MemoryStore::new();
        let mut session = open(&store, "").await;
        let ctx = DispatchContext { store: &store, user_id: "u" };

        let outcome = dispatch(&mut session, &ctx, "setLanguage", Some("fr")).await;
        assert!(error_message(&outcome).contains("fr"));

        let outcome = dispatch(&mut session, &ctx, "startDictation", Some("es")).await;
        assert!(matches!(outcome.effect, Effect::Dictation(status) if status.listening));

        let outcome = dispatch(&mut session, &ctx, "startDictation", None).await;
        assert!(error_message(&outcome).contains("already started"));
        assert!(session.dictation.status().listening);

        let outcome = dispatch(&mut session, &ctx, "stopDictation", None).await;
        assert!(matches!(outcome.effect, Effect::Dictation(status) if !status.listening));
    }

    #[tokio::test]
    async fn large_insert_creates_a_page() {
        let store = MemoryStore::new();
        let mut session = open(&store, "").await;
        let ctx = DispatchContext { store: &store, user_id: "u" };

        let outcome = dispatch(&mut session, &ctx, "insertTable", Some("60x1")).await;

        assert!(outcome.page_created.is_some());
        assert_eq!(session.paginator.pages().len(), 2);
        assert_eq!(session.paginator.current(), 1);
    }

    #[tokio::test]
    async fn paste_uses_surface_clipboard() {
        let store = MemoryStore::new();
        let document = store.save_document("u", "copy me", None).await.unwrap();
        let mut session = EditorSession::with_surface(
            &document,
            Box::new(HtmlSurface::default()),
            SessionSettings::default(),
        );
        let ctx = DispatchContext { store: &store, user_id: "u" };

        session.surface.select(0..4).unwrap();
        dispatch(&mut session, &ctx, "copy", None).await;
        dispatch(&mut session, &ctx, "paste", None).await;

        assert_eq!(session.surface.content(), "copy me");
        assert_eq!(session.surface.clipboard(), Some("copy"));
    }
}
