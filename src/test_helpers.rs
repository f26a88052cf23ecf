//! Shared test doubles for the messaging and fetching seams.

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::artifact::Artifact;
use crate::error::{FetchError, TelegramError};
use crate::fetcher::{FetchRequest, ProgressObserver, VideoFetcher};
use crate::messaging::Messenger;
use crate::types::{ChatId, FetchProgress, MessageHandle, MessageId};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::time::Duration;

/// One call made against [`RecordingMessenger`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    SendText { chat: ChatId, text: String },
    Edit { handle: MessageHandle, text: String },
    Delete { handle: MessageHandle },
    SendVideo { chat: ChatId, bytes: usize, caption: String },
}

/// Messenger that records every call and can be told to fail.
///
/// Placeholder handles are numbered from 1000 upwards.
#[derive(Default)]
pub(crate) struct RecordingMessenger {
    pub(crate) calls: Mutex<Vec<Call>>,
    pub(crate) next_id: AtomicI64,
    pub(crate) fail_send_text: bool,
    pub(crate) fail_upload: bool,
    pub(crate) fail_edit: bool,
    pub(crate) fail_delete: bool,
    pub(crate) upload_delay: Option<Duration>,
}

impl RecordingMessenger {
    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SendText { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn videos(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::SendVideo { .. }))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn api_error() -> TelegramError {
    TelegramError::Api {
        code: 400,
        description: "Bad Request".into(),
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(
        &self,
        chat: ChatId,
        _reply_to: Option<MessageId>,
        text: &str,
    ) -> Result<MessageHandle, TelegramError> {
        self.record(Call::SendText {
            chat,
            text: text.to_string(),
        });
        if self.fail_send_text {
            return Err(api_error());
        }
        Ok(MessageHandle {
            chat,
            message_id: MessageId(1000 + self.next_id.fetch_add(1, Ordering::SeqCst)),
        })
    }

    async fn edit_text(&self, handle: MessageHandle, text: &str) -> Result<(), TelegramError> {
        self.record(Call::Edit {
            handle,
            text: text.to_string(),
        });
        if self.fail_edit { Err(api_error()) } else { Ok(()) }
    }

    async fn delete_message(&self, handle: MessageHandle) -> Result<(), TelegramError> {
        self.record(Call::Delete { handle });
        if self.fail_delete { Err(api_error()) } else { Ok(()) }
    }

    async fn send_video(
        &self,
        chat: ChatId,
        _reply_to: Option<MessageId>,
        video: &Path,
        caption: &str,
    ) -> Result<(), TelegramError> {
        let bytes = tokio::fs::read(video).await?;
        if let Some(delay) = self.upload_delay {
            tokio::time::sleep(delay).await;
        }
        self.record(Call::SendVideo {
            chat,
            bytes: bytes.len(),
            caption: caption.to_string(),
        });
        if self.fail_upload { Err(api_error()) } else { Ok(()) }
    }
}

/// What [`StubFetcher`] does on every fetch.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Behavior {
    /// Create a file of this many bytes at the output path
    Write(u64),
    /// Fail like yt-dlp with a non-zero exit
    Fail,
    /// Leave a `.part` side file behind, then fail
    PartialThenFail,
    /// Leave fragment and fixup temp files behind, then fail
    FragmentsThenFail,
    /// Write a partial output and never finish
    Hang,
}

/// Fetcher that follows a fixed [`Behavior`] and counts calls.
pub(crate) struct StubFetcher {
    behavior: Behavior,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub(crate) fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoFetcher for StubFetcher {
    async fn fetch(
        &self,
        request: &FetchRequest,
        observer: &dyn ProgressObserver,
    ) -> Result<Artifact, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Write(len) => {
                observer.on_progress(FetchProgress::Downloading { percent: Some(50.0) });
                let file = tokio::fs::File::create(&request.output).await?;
                file.set_len(len).await?;
                observer.on_progress(FetchProgress::Finished);
                Ok(Artifact::from_path(&request.output).await?)
            }
            Behavior::Fail => Err(FetchError::ExitStatus {
                code: Some(1),
                stderr: "ERROR: Video unavailable".into(),
            }),
            Behavior::PartialThenFail => {
                let mut part = request.output.clone().into_os_string();
                part.push(".part");
                tokio::fs::write(&part, b"partial").await?;
                Err(FetchError::ExitStatus {
                    code: Some(1),
                    stderr: "ERROR: connection reset".into(),
                })
            }
            Behavior::FragmentsThenFail => {
                let mut fragment = request.output.clone().into_os_string();
                fragment.push(".part-Frag1");
                tokio::fs::write(&fragment, b"fragment").await?;
                tokio::fs::write(request.output.with_extension("temp.mp4"), b"fixup").await?;
                Err(FetchError::ExitStatus {
                    code: Some(1),
                    stderr: "ERROR: fragment 2 not found".into(),
                })
            }
            Behavior::Hang => {
                tokio::fs::write(&request.output, b"half").await?;
                tokio::time::sleep(Duration::from_secs(30)).await;
                Err(FetchError::NoOutput {
                    path: request.output.clone(),
                })
            }
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}
