//! Reducer/state container for the interview hub.
//!
//! Every fetch is tagged with a monotonically increasing sequence number.
//! A completion (success or failure) is applied only while its tag is still
//! the one the resource is waiting on, so a superseded in-flight request can
//! never overwrite newer state.

use std::sync::Mutex;

use crate::api::questions::CategoryEntry;
use crate::client::api::{ApiClient, ClientError, ListFilter};
use crate::models::question::{InterviewQuestion, QuestionStats};

/// Lifecycle of one logical fetched resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource<T> {
    Idle,
    Loading { seq: u64 },
    Loaded(T),
    Error(String),
}

impl<T> Resource<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::Loading { .. })
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Resource::Loaded(data) => Some(data),
            _ => None,
        }
    }

    /// Whether a completion tagged `seq` is the one this resource awaits.
    fn accepts(&self, seq: u64) -> bool {
        matches!(self, Resource::Loading { seq: pending } if *pending == seq)
    }
}

/// Client-side question filters, reset when the category changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    pub search: String,
    pub difficulty: String,
    pub question_type: String,
    pub sort_by: String,
}

/// Which resource a fetch action refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Categories,
    Questions,
    Stats,
}

/// Counter a loaded question can bump locally after a successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionStat {
    Views,
    Likes,
}

#[derive(Debug)]
pub enum Action {
    FetchStarted {
        kind: FetchKind,
        seq: u64,
    },
    CategoriesLoaded {
        seq: u64,
        data: Vec<CategoryEntry>,
    },
    QuestionsLoaded {
        seq: u64,
        data: Vec<InterviewQuestion>,
    },
    StatsLoaded {
        seq: u64,
        data: QuestionStats,
    },
    FetchFailed {
        kind: FetchKind,
        seq: u64,
        message: String,
    },
    /// Selecting a category clears the question list and resets filters.
    CategorySelected(Option<String>),
    FiltersUpdated(Filters),
    StatBumped {
        question_id: String,
        stat: QuestionStat,
    },
    ErrorCleared(FetchKind),
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HubState {
    pub categories: Resource<Vec<CategoryEntry>>,
    pub questions: Resource<Vec<InterviewQuestion>>,
    pub stats: Resource<QuestionStats>,
    pub selected_category: Option<String>,
    pub filters: Filters,
    next_seq: u64,
}

impl Default for HubState {
    fn default() -> Self {
        Self {
            categories: Resource::Idle,
            questions: Resource::Idle,
            stats: Resource::Idle,
            selected_category: None,
            filters: Filters::default(),
            next_seq: 0,
        }
    }
}

impl HubState {
    /// Allocate the tag for a new fetch. The caller dispatches
    /// `FetchStarted` with it and tags the eventual completion the same way.
    pub fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn resource_mut(&mut self, kind: FetchKind) -> ResourceSlot<'_> {
        match kind {
            FetchKind::Categories => ResourceSlot::Categories(&mut self.categories),
            FetchKind::Questions => ResourceSlot::Questions(&mut self.questions),
            FetchKind::Stats => ResourceSlot::Stats(&mut self.stats),
        }
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::FetchStarted { kind, seq } => match self.resource_mut(kind) {
                ResourceSlot::Categories(r) => *r = Resource::Loading { seq },
                ResourceSlot::Questions(r) => *r = Resource::Loading { seq },
                ResourceSlot::Stats(r) => *r = Resource::Loading { seq },
            },
            Action::CategoriesLoaded { seq, data } => {
                if self.categories.accepts(seq) {
                    self.categories = Resource::Loaded(data);
                }
            }
            Action::QuestionsLoaded { seq, data } => {
                if self.questions.accepts(seq) {
                    self.questions = Resource::Loaded(data);
                }
            }
            Action::StatsLoaded { seq, data } => {
                if self.stats.accepts(seq) {
                    self.stats = Resource::Loaded(data);
                }
            }
            Action::FetchFailed { kind, seq, message } => match self.resource_mut(kind) {
                ResourceSlot::Categories(r) => {
                    if r.accepts(seq) {
                        *r = Resource::Error(message);
                    }
                }
                ResourceSlot::Questions(r) => {
                    if r.accepts(seq) {
                        *r = Resource::Error(message);
                    }
                }
                ResourceSlot::Stats(r) => {
                    if r.accepts(seq) {
                        *r = Resource::Error(message);
                    }
                }
            },
            Action::CategorySelected(category) => {
                self.selected_category = category;
                self.questions = Resource::Idle;
                self.filters = Filters::default();
            }
            Action::FiltersUpdated(filters) => {
                self.filters = filters;
            }
            Action::StatBumped { question_id, stat } => {
                if let Resource::Loaded(questions) = &mut self.questions {
                    for question in questions.iter_mut() {
                        let matches = question
                            .id
                            .map(|id| id.to_hex() == question_id)
                            .unwrap_or(false);
                        if matches {
                            match stat {
                                QuestionStat::Views => question.views += 1,
                                QuestionStat::Likes => question.likes += 1,
                            }
                        }
                    }
                }
            }
            Action::ErrorCleared(kind) => match self.resource_mut(kind) {
                ResourceSlot::Categories(r) => {
                    if matches!(r, Resource::Error(_)) {
                        *r = Resource::Idle;
                    }
                }
                ResourceSlot::Questions(r) => {
                    if matches!(r, Resource::Error(_)) {
                        *r = Resource::Idle;
                    }
                }
                ResourceSlot::Stats(r) => {
                    if matches!(r, Resource::Error(_)) {
                        *r = Resource::Idle;
                    }
                }
            },
            Action::Reset => *self = HubState::default(),
        }
    }
}

enum ResourceSlot<'a> {
    Categories(&'a mut Resource<Vec<CategoryEntry>>),
    Questions(&'a mut Resource<Vec<InterviewQuestion>>),
    Stats(&'a mut Resource<QuestionStats>),
}

/// Orchestrates fetches over the API client and feeds the reducer.
pub struct Hub {
    api: ApiClient,
    state: Mutex<HubState>,
}

impl Hub {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: Mutex::new(HubState::default()),
        }
    }

    pub fn state(&self) -> HubState {
        self.state.lock().unwrap().clone()
    }

    fn begin(&self, kind: FetchKind) -> u64 {
        let mut state = self.state.lock().unwrap();
        let seq = state.next_seq();
        state.apply(Action::FetchStarted { kind, seq });
        seq
    }

    fn finish(&self, action: Action) {
        self.state.lock().unwrap().apply(action);
    }

    pub async fn fetch_categories(&self) {
        let seq = self.begin(FetchKind::Categories);
        match self.api.question_categories().await {
            Ok(envelope) => self.finish(Action::CategoriesLoaded {
                seq,
                data: envelope.data,
            }),
            Err(err) => self.finish(Action::FetchFailed {
                kind: FetchKind::Categories,
                seq,
                message: fetch_error_message(&err, "Failed to fetch categories"),
            }),
        }
    }

    /// Select a category and load its questions.
    pub async fn select_category(&self, category: Option<String>) {
        self.state
            .lock()
            .unwrap()
            .apply(Action::CategorySelected(category.clone()));
        self.fetch_questions().await;
    }

    /// Fetch questions for the current category and filters.
    pub async fn fetch_questions(&self) {
        let (seq, filter) = {
            let mut state = self.state.lock().unwrap();
            let seq = state.next_seq();
            state.apply(Action::FetchStarted {
                kind: FetchKind::Questions,
                seq,
            });
            let filter = ListFilter {
                category: state.selected_category.clone(),
                search: non_empty(&state.filters.search),
                difficulty: non_empty(&state.filters.difficulty),
                question_type: non_empty(&state.filters.question_type),
                ..Default::default()
            };
            (seq, filter)
        };

        match self.api.list_questions(&filter).await {
            Ok(envelope) => self.finish(Action::QuestionsLoaded {
                seq,
                data: envelope.data,
            }),
            Err(err) => self.finish(Action::FetchFailed {
                kind: FetchKind::Questions,
                seq,
                message: fetch_error_message(&err, "Failed to fetch questions"),
            }),
        }
    }

    pub async fn fetch_stats(&self) {
        let seq = self.begin(FetchKind::Stats);
        match self.api.question_stats().await {
            Ok(envelope) => self.finish(Action::StatsLoaded {
                seq,
                data: envelope.data,
            }),
            Err(err) => self.finish(Action::FetchFailed {
                kind: FetchKind::Stats,
                seq,
                message: fetch_error_message(&err, "Failed to fetch stats"),
            }),
        }
    }

    /// Like a question server-side and mirror the bump locally.
    pub async fn like_question(&self, id: &str) {
        if self.api.like_question(id).await.is_ok() {
            self.finish(Action::StatBumped {
                question_id: id.to_string(),
                stat: QuestionStat::Likes,
            });
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn fetch_error_message(err: &ClientError, fallback: &str) -> String {
    match err {
        ClientError::Api { message, .. } => message.clone(),
        ClientError::Transport(_) => fallback.to_string(),
    }
}
