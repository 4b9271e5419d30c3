//! Session controller: turns one trigger request plus a push channel into an
//! incrementally updated, cancelable transcript.
//!
//! At most one session runs per controller. Internal state sits behind a
//! single mutex that is never held across an `.await`; chunk application
//! checks the session token under that lock, so once [`abort_session`]
//! returns no further chunk reaches the transcript. Every session carries a
//! generation id and all state updates are keyed on it.
//!
//! [`abort_session`]: SessionController::abort_session

use std::ops::Range;
use std::sync::Arc;

use chatbench_models::{
    CompletionParams, CompletionRequest, GenerationParameters, Message, Role,
};
use futures::StreamExt;
use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::SessionError;
use super::state::{SessionConfig, SessionEvent, SessionOutcome, SessionState, SessionStatus};
use crate::transcript::Transcript;
use crate::transport::{CompletionTransport, END_SENTINEL, TransportError};

struct ActiveSession {
    id: u64,
    token: CancellationToken,
    /// Streaming buffer: everything applied to the open slot so far.
    buffer: String,
    chunks: usize,
}

struct Inner {
    transcript: Transcript,
    session: Option<ActiveSession>,
    next_id: u64,
}

struct Shared {
    transport: Arc<dyn CompletionTransport>,
    config: SessionConfig,
    inner: Mutex<Inner>,
    state: watch::Sender<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

enum Ending {
    Completed,
    Aborted,
    Failed(SessionError),
}

#[derive(Clone)]
pub struct SessionController {
    shared: Arc<Shared>,
}

impl SessionController {
    pub fn new(transport: Arc<dyn CompletionTransport>) -> Self {
        Self::with_config(transport, SessionConfig::default())
    }

    pub fn with_config(transport: Arc<dyn CompletionTransport>, config: SessionConfig) -> Self {
        let (state, _) = watch::channel(SessionState::Idle);
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            shared: Arc::new(Shared {
                transport,
                config,
                inner: Mutex::new(Inner {
                    transcript: Transcript::new(),
                    session: None,
                    next_id: 1,
                }),
                state,
                events,
            }),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.shared.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.shared.state.subscribe()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.events.subscribe()
    }

    pub fn is_active(&self) -> bool {
        self.shared.inner.lock().session.is_some()
    }

    /// Snapshot of the transcript.
    pub fn transcript(&self) -> Transcript {
        self.shared.inner.lock().transcript.clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.shared.inner.lock().transcript.messages().to_vec()
    }

    /// Replace the transcript wholesale, e.g. with one loaded from disk.
    pub fn load_transcript(&self, messages: Vec<Message>) -> Result<(), SessionError> {
        let mut inner = self.shared.inner.lock();
        if inner.session.is_some() {
            return Err(SessionError::SessionBusy);
        }
        inner.transcript = Transcript::from_messages(messages);
        Ok(())
    }

    pub fn append(&self, message: Message) -> usize {
        self.shared.inner.lock().transcript.append(message)
    }

    pub fn replace_content_at(
        &self,
        index: usize,
        content: impl Into<String>,
    ) -> Result<(), SessionError> {
        let mut inner = self.shared.inner.lock();
        inner.transcript.replace_content_at(index, content)?;
        Ok(())
    }

    pub fn remove_range(&self, range: Range<usize>) -> Result<Vec<Message>, SessionError> {
        let mut inner = self.shared.inner.lock();
        Ok(inner.transcript.remove_range(range)?)
    }

    pub fn remove_from(&self, index: usize) -> Result<Vec<Message>, SessionError> {
        let mut inner = self.shared.inner.lock();
        Ok(inner.transcript.remove_from(index)?)
    }

    /// Run one session to completion.
    ///
    /// The transcript is rewritten to `[system, ...prior]` plus an empty
    /// assistant row before any request is made. System rows in `prior` are
    /// skipped. Resolves once the stream has ended or the session was
    /// aborted; dropping the returned future releases the session.
    pub async fn start_session(
        &self,
        prior: Vec<Message>,
        system_message: impl Into<String>,
        params: CompletionParams,
    ) -> Result<SessionOutcome, SessionError> {
        let (id, token, request) = self.begin(prior, system_message.into(), &params)?;
        let _release = scopeguard::guard((), |_| self.release(id));

        let ending = self.drive(id, &token, &request).await;
        self.finish(id, ending)
    }

    /// [`start_session`](Self::start_session) with a preset's parameters.
    pub async fn start_with(
        &self,
        prior: Vec<Message>,
        params: GenerationParameters,
    ) -> Result<SessionOutcome, SessionError> {
        let GenerationParameters {
            completion,
            system_message,
        } = params;
        self.start_session(prior, system_message, completion).await
    }

    /// Stop the running session, keeping whatever content already arrived.
    ///
    /// The server is asked to stop as well; a failure to reach it is only
    /// logged. Calling this while a session is already unwinding from an
    /// abort is a no-op.
    ///
    /// The state reads [`SessionState::Aborted`] once this returns; it moves
    /// to `Idle` when the pending `start_session` future resolves.
    pub async fn abort_session(&self) -> Result<(), SessionError> {
        let id = {
            let inner = self.shared.inner.lock();
            let Some(session) = inner.session.as_ref() else {
                return Err(SessionError::NoActiveSession);
            };
            if session.token.is_cancelled() {
                return Ok(());
            }
            session.token.cancel();
            self.set_state(SessionState::Aborted);
            session.id
        };

        info!(session = id, "Aborting chat session");
        if let Err(e) = self.shared.transport.abort().await {
            warn!(session = id, error = %e, "Abort request failed");
        }
        Ok(())
    }

    fn begin(
        &self,
        prior: Vec<Message>,
        system_message: String,
        params: &CompletionParams,
    ) -> Result<(u64, CancellationToken, CompletionRequest), SessionError> {
        let mut inner = self.shared.inner.lock();
        if inner.session.is_some() {
            return Err(SessionError::SessionBusy);
        }

        let id = inner.next_id;
        inner.next_id += 1;

        let mut outbound = Vec::with_capacity(prior.len() + 1);
        outbound.push(Message::system(system_message));
        outbound.extend(prior.into_iter().filter(|m| m.role != Role::System));
        let request = CompletionRequest::new(params, outbound.clone());

        let slot = inner.transcript.begin_session(outbound);
        let token = CancellationToken::new();
        inner.session = Some(ActiveSession {
            id,
            token: token.clone(),
            buffer: String::new(),
            chunks: 0,
        });

        self.set_state(SessionState::Submitting);
        self.emit(SessionEvent::Started { session: id, slot });
        info!(
            session = id,
            model = %request.model,
            messages = request.messages.len(),
            "Starting chat session"
        );

        Ok((id, token, request))
    }

    async fn drive(
        &self,
        id: u64,
        token: &CancellationToken,
        request: &CompletionRequest,
    ) -> Ending {
        let transport = self.shared.transport.clone();

        let mut channel = tokio::select! {
            biased;
            _ = token.cancelled() => return Ending::Aborted,
            opened = transport.open_channel() => match opened {
                Ok(channel) => channel,
                Err(e) => return Ending::Failed(SessionError::SubmissionFailed(e)),
            },
        };

        let mut trigger = transport.trigger(request);
        let mut trigger_done = false;
        let mut drain_deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => return Ending::Aborted,
                result = &mut trigger, if !trigger_done => {
                    trigger_done = true;
                    match result {
                        Ok(()) => {
                            self.mark_streaming(id);
                            drain_deadline =
                                Some(Instant::now() + self.shared.config.drain_timeout);
                        }
                        Err(e) => return Ending::Failed(self.trigger_failure(id, e)),
                    }
                }
                item = channel.next() => match item {
                    Some(Ok(chunk)) if chunk == END_SENTINEL => return Ending::Completed,
                    Some(Ok(chunk)) => {
                        if !self.apply_chunk(id, &chunk) {
                            return Ending::Aborted;
                        }
                        // The drain window measures idleness, not total length.
                        if drain_deadline.is_some() {
                            drain_deadline =
                                Some(Instant::now() + self.shared.config.drain_timeout);
                        }
                    }
                    Some(Err(e)) => return Ending::Failed(SessionError::StreamInterrupted(e)),
                    None => return Ending::Completed,
                },
                _ = sleep_until(drain_deadline.unwrap_or_else(Instant::now)),
                    if drain_deadline.is_some() =>
                {
                    debug!(session = id, "Push channel idle after trigger returned");
                    return Ending::Completed;
                }
            }
        }
    }

    fn mark_streaming(&self, id: u64) {
        let inner = self.shared.inner.lock();
        if let Some(session) = inner.session.as_ref()
            && session.id == id
            && !session.token.is_cancelled()
            && self.state() == SessionState::Submitting
        {
            self.set_state(SessionState::Streaming);
        }
    }

    fn apply_chunk(&self, id: u64, chunk: &str) -> bool {
        let mut inner = self.shared.inner.lock();
        let Inner {
            transcript,
            session,
            ..
        } = &mut *inner;

        let Some(session) = session.as_mut().filter(|s| s.id == id) else {
            return false;
        };
        if session.token.is_cancelled() {
            return false;
        }
        if self.state() == SessionState::Submitting {
            self.set_state(SessionState::Streaming);
        }

        transcript.apply_chunk(chunk);
        session.buffer.push_str(chunk);
        session.chunks += 1;
        self.emit(SessionEvent::Chunk {
            session: id,
            text: chunk.to_string(),
        });
        true
    }

    fn trigger_failure(&self, id: u64, error: TransportError) -> SessionError {
        let chunks = self
            .shared
            .inner
            .lock()
            .session
            .as_ref()
            .filter(|s| s.id == id)
            .map_or(0, |s| s.chunks);
        if chunks == 0 {
            SessionError::SubmissionFailed(error)
        } else {
            SessionError::StreamInterrupted(error)
        }
    }

    fn finish(&self, id: u64, ending: Ending) -> Result<SessionOutcome, SessionError> {
        let mut inner = self.shared.inner.lock();
        let Some(session) = inner.session.take_if(|s| s.id == id) else {
            return Err(SessionError::NoActiveSession);
        };

        let ending = if session.token.is_cancelled() {
            Ending::Aborted
        } else {
            ending
        };
        session.token.cancel();

        if !matches!(ending, Ending::Aborted) {
            self.set_state(SessionState::Finalizing);
        }
        inner.transcript.close_slot();

        let ActiveSession {
            buffer: content,
            chunks,
            ..
        } = session;

        let result = match ending {
            Ending::Completed => {
                info!(session = id, chunks, "Chat session completed");
                self.emit(SessionEvent::Completed {
                    session: id,
                    content: content.clone(),
                });
                Ok(SessionOutcome {
                    status: SessionStatus::Completed,
                    content,
                    chunks,
                })
            }
            Ending::Aborted => {
                info!(session = id, chunks, "Chat session aborted");
                self.emit(SessionEvent::Aborted {
                    session: id,
                    content: content.clone(),
                });
                Ok(SessionOutcome {
                    status: SessionStatus::Aborted,
                    content,
                    chunks,
                })
            }
            Ending::Failed(error) => {
                warn!(session = id, chunks, error = %error, "Chat session failed");
                self.emit(SessionEvent::Failed {
                    session: id,
                    error: error.to_string(),
                });
                Err(error)
            }
        };

        self.set_state(SessionState::Idle);
        result
    }

    /// Runs when `start_session`'s future is dropped. A no-op once the
    /// session has finished normally.
    fn release(&self, id: u64) {
        let mut inner = self.shared.inner.lock();
        if let Some(session) = inner.session.take_if(|s| s.id == id) {
            session.token.cancel();
            inner.transcript.close_slot();
            debug!(session = id, "Chat session released before finishing");
            self.emit(SessionEvent::Aborted {
                session: id,
                content: session.buffer,
            });
            self.set_state(SessionState::Idle);
        }
    }

    fn set_state(&self, state: SessionState) {
        self.shared.state.send_replace(state);
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.shared.events.send(event);
    }
}
