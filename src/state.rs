//! Application state: in-memory challenge store, audio defaults, reveal policy.
//!
//! This module owns:
//!   - challenge stores (by id, by lesson in insertion order)
//!   - default audio settings handed to every new session
//!   - the show-correct-answer policy
//!
//! Config-bank challenges are inserted first; built-in seeds never overwrite them.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::{error, info, instrument};

use crate::config::{load_engine_config_from_env, EngineConfig};
use crate::content::audit_and_log;
use crate::domain::LessonItem;
use crate::engine::media::AudioSettings;
use crate::seeds::{seed_lesson, SEED_LESSON};

#[derive(Clone)]
pub struct AppState {
    pub by_id: Arc<RwLock<HashMap<i64, LessonItem>>>,
    pub by_lesson: Arc<RwLock<HashMap<String, Vec<i64>>>>,
    pub default_lesson: String,
    pub audio: AudioSettings,
    pub show_correct_answer: bool,
}

impl AppState {
    /// Build state from env: load config, insert bank + seeds, audit content.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        Self::from_config(load_engine_config_from_env())
    }

    pub fn from_config(cfg: Option<EngineConfig>) -> Self {
        let cfg = cfg.unwrap_or_default();

        let mut id_map = HashMap::<i64, LessonItem>::new();
        let mut lesson_map = HashMap::<String, Vec<i64>>::new();
        let mut default_lesson: Option<String> = None;

        for cc in cfg.challenges {
            let question = cc.question.clone();
            let Some(item) = cc.into_item() else {
                error!(target: "challenge", %question, "Skipping bank item: missing id.");
                continue;
            };
            let id = item.challenge.id;
            if id_map.contains_key(&id) {
                error!(target: "challenge", id, "Skipping bank item: duplicate id.");
                continue;
            }
            default_lesson.get_or_insert_with(|| item.lesson.clone());
            lesson_map.entry(item.lesson.clone()).or_default().push(id);
            id_map.insert(id, item);
        }

        // Built-in seeds, but don't overwrite existing ids.
        for item in seed_lesson() {
            let id = item.challenge.id;
            if id_map.contains_key(&id) {
                continue;
            }
            lesson_map.entry(item.lesson.clone()).or_default().push(id);
            id_map.insert(id, item);
        }

        for (lesson, ids) in &lesson_map {
            info!(target: "challenge", %lesson, challenges = ids.len(), "Startup lesson inventory");
        }
        let issues = audit_and_log(id_map.values());
        if issues > 0 {
            info!(target: "challenge", issues, "Content audit finished with issues");
        }

        Self {
            by_id: Arc::new(RwLock::new(id_map)),
            by_lesson: Arc::new(RwLock::new(lesson_map)),
            default_lesson: default_lesson.unwrap_or_else(|| SEED_LESSON.to_string()),
            audio: cfg.audio.sanitized(),
            show_correct_answer: cfg.presentation.show_correct_answer,
        }
    }

    /// Read-only access to a challenge by id.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_item(&self, id: i64) -> Option<LessonItem> {
        self.by_id.read().await.get(&id).cloned()
    }

    /// Items of a lesson in authoring order; `None` for an unknown lesson.
    #[instrument(level = "debug", skip(self), fields(%lesson))]
    pub async fn lesson_items(&self, lesson: &str) -> Option<Vec<LessonItem>> {
        let ids = { self.by_lesson.read().await.get(lesson).cloned() }?;
        let by_id = self.by_id.read().await;
        Some(ids.iter().filter_map(|id| by_id.get(id).cloned()).collect())
    }

    /// All items, or one lesson's, sorted by lesson then id.
    pub async fn list(&self, lesson: Option<&str>) -> Vec<LessonItem> {
        let by_id = self.by_id.read().await;
        let mut items: Vec<LessonItem> = by_id
            .values()
            .filter(|i| lesson.map_or(true, |l| i.lesson == l))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.lesson.cmp(&b.lesson).then(a.challenge.id.cmp(&b.challenge.id)));
        items
    }
}
