//! The "produce one poem" cycle.
//!
//! A cycle picks a headline, types it out, asks the poem source for a poem,
//! types that out and records the result in history. Progress is published
//! as [`PipelineEvent`]s over a channel; the UI applies them to its own state.
//!
//! Cycles are rate limited: a call that starts less than [`COOLDOWN`] after
//! the previous accepted call, while another cycle is still in flight, or
//! while a reveal is still running, is dropped without any visible effect.
//! Dropped calls are not queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use rand::seq::SliceRandom;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;

use crate::animator::{Animator, HEADLINE_DELAY, POEM_DELAY};
use crate::cache::HeadlineCache;
use crate::locale::{Category, LanguageChoice};
use crate::source::{GeneratedEntry, Headline, PoemSource};
use crate::store::Library;

/// Minimum spacing between the starts of two accepted cycles.
pub const COOLDOWN: Duration = Duration::from_secs(15);

pub const NO_HEADLINES: &str = "No headlines right now. Try again.";
pub const POEM_FAILED: &str = "Could not generate haiku.";
pub const POEM_FAILED_TOAST: &str = "Haiku generation failed";

/// State changes published during a cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// Skeleton/busy indicator on or off.
    Busy(bool),
    /// Replace the headline output text.
    HeadlineText(String),
    /// Replace the poem output text.
    PoemText(String),
    /// The headline this cycle is working on.
    Current(Headline),
    /// The cycle finished and `entry` was added to history.
    Recorded {
        entry: GeneratedEntry,
        favorited: bool,
    },
    /// Short-lived notification.
    Toast(String),
}

/// What one call to [`Generator::generate`] ended with.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Dropped by the cooldown or because a reveal was running.
    Rejected,
    /// The headline pool was empty.
    NoHeadlines,
    /// The poem could not be produced.
    Failed,
    Completed(GeneratedEntry),
}

/// The selections a cycle works from, captured when it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub category: Category,
    pub country: String,
    pub language: LanguageChoice,
}

pub struct Generator {
    cache: Arc<HeadlineCache>,
    poet: Arc<dyn PoemSource>,
    animator: Animator,
    library: Arc<Library>,
    cooldown: Duration,
    last_started: Mutex<Option<Instant>>,
    in_flight: AtomicBool,
}

/// Marks a cycle in flight; cleared on drop, even if the task is torn down.
struct CycleGuard<'a>(&'a AtomicBool);

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Generator {
    pub fn new(
        cache: Arc<HeadlineCache>,
        poet: Arc<dyn PoemSource>,
        animator: Animator,
        library: Arc<Library>,
    ) -> Self {
        Self::with_cooldown(cache, poet, animator, library, COOLDOWN)
    }

    pub fn with_cooldown(
        cache: Arc<HeadlineCache>,
        poet: Arc<dyn PoemSource>,
        animator: Animator,
        library: Arc<Library>,
        cooldown: Duration,
    ) -> Self {
        Self {
            cache,
            poet,
            animator,
            library,
            cooldown,
            last_started: Mutex::new(None),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn cache(&self) -> &Arc<HeadlineCache> {
        &self.cache
    }

    /// True while a headline or poem is being typed out.
    pub fn is_revealing(&self) -> bool {
        self.animator.is_busy()
    }

    /// Run one cycle. See the module docs for when a call is rejected.
    pub async fn generate(
        &self,
        request: Request,
        events: &UnboundedSender<PipelineEvent>,
    ) -> Outcome {
        let Some(_cycle) = self.try_begin() else {
            tracing::debug!("generate ignored: cooling down, in flight or revealing");
            return Outcome::Rejected;
        };
        let emit = |event: PipelineEvent| {
            // The UI going away mid-cycle is not an error for the cycle.
            let _ = events.send(event);
        };

        emit(PipelineEvent::Busy(true));
        emit(PipelineEvent::HeadlineText(String::new()));
        emit(PipelineEvent::PoemText(String::new()));

        let outcome = self.run(&request, &emit).await;

        emit(PipelineEvent::Busy(false));
        outcome
    }

    /// Check and stamp the cooldown and the in-flight flag under one lock.
    fn try_begin(&self) -> Option<CycleGuard<'_>> {
        let mut last = self.last_started.lock();
        if self.animator.is_busy() || self.in_flight.load(Ordering::Acquire) {
            return None;
        }
        let now = Instant::now();
        if let Some(previous) = *last {
            if now.duration_since(previous) < self.cooldown {
                return None;
            }
        }
        *last = Some(now);
        self.in_flight.store(true, Ordering::Release);
        Some(CycleGuard(&self.in_flight))
    }

    async fn run<F>(&self, request: &Request, emit: &F) -> Outcome
    where
        F: Fn(PipelineEvent) + Sync,
    {
        let pool = self.cache.ensure(request.category, &request.country).await;
        let Some(headline) = pick(&pool) else {
            tracing::info!(category = %request.category, country = %request.country, "no headlines");
            emit(PipelineEvent::HeadlineText(NO_HEADLINES.to_string()));
            emit(PipelineEvent::PoemText(String::new()));
            return Outcome::NoHeadlines;
        };

        emit(PipelineEvent::Current(headline.clone()));
        self.animator
            .reveal(
                |s| emit(PipelineEvent::HeadlineText(s.to_string())),
                &headline.title,
                HEADLINE_DELAY,
            )
            .await;

        let language = request.language.resolve(&request.country);
        let poem = match self.poet.compose(&headline.title, &language).await {
            Ok(poem) if !poem.trim().is_empty() => poem,
            Ok(_) => {
                tracing::warn!(poet = self.poet.name(), "empty poem");
                return fail(emit);
            }
            Err(e) => {
                tracing::warn!(poet = self.poet.name(), error = %e, "poem request failed");
                return fail(emit);
            }
        };

        self.animator
            .reveal(
                |s| emit(PipelineEvent::PoemText(s.to_string())),
                &poem,
                POEM_DELAY,
            )
            .await;

        let entry = GeneratedEntry::new(
            &headline,
            poem,
            Utc::now(),
            request.country.clone(),
            request.category,
            language,
        );
        let favorited = self.library.is_favorite(&entry);
        self.library.record(entry.clone());
        tracing::info!(title = %entry.title, language = %entry.poem_language, "poem recorded");

        emit(PipelineEvent::Recorded {
            entry: entry.clone(),
            favorited,
        });
        Outcome::Completed(entry)
    }
}

fn fail<F: Fn(PipelineEvent)>(emit: &F) -> Outcome {
    emit(PipelineEvent::PoemText(POEM_FAILED.to_string()));
    emit(PipelineEvent::Toast(POEM_FAILED_TOAST.to_string()));
    Outcome::Failed
}

/// Uniformly random pick.
fn pick(pool: &[Headline]) -> Option<Headline> {
    pool.choose(&mut rand::thread_rng()).cloned()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use tokio::sync::mpsc;

    use super::*;
    use crate::source::PoemError;
    use crate::store::MemoryStore;
    use crate::testing::{RecordingBeeper, ScriptedPoet, StaticHeadlines};

    struct Harness {
        generator: Generator,
        headlines: Arc<StaticHeadlines>,
        poet: Arc<ScriptedPoet>,
        library: Arc<Library>,
        tx: mpsc::UnboundedSender<PipelineEvent>,
        rx: mpsc::UnboundedReceiver<PipelineEvent>,
    }

    impl Harness {
        fn new(titles: &[&str]) -> Self {
            Self::build(titles, ScriptedPoet::default(), COOLDOWN)
        }

        fn build(titles: &[&str], poet: ScriptedPoet, cooldown: Duration) -> Self {
            let headlines = Arc::new(StaticHeadlines::new(titles));
            let poet = Arc::new(poet);
            let library = Arc::new(Library::load(Arc::new(MemoryStore::new())));
            let animator = Animator::new(
                Arc::new(RecordingBeeper::default()),
                Arc::new(AtomicBool::new(true)),
                false,
            );
            let generator = Generator::with_cooldown(
                Arc::new(HeadlineCache::new(headlines.clone())),
                poet.clone(),
                animator,
                library.clone(),
                cooldown,
            );
            let (tx, rx) = mpsc::unbounded_channel();
            Self {
                generator,
                headlines,
                poet,
                library,
                tx,
                rx,
            }
        }

        async fn generate(&self, country: &str, language: LanguageChoice) -> Outcome {
            let request = Request {
                category: Category::General,
                country: country.to_string(),
                language,
            };
            self.generator.generate(request, &self.tx).await
        }

        fn drain(&mut self) -> Vec<PipelineEvent> {
            let mut events = Vec::new();
            while let Ok(event) = self.rx.try_recv() {
                events.push(event);
            }
            events
        }
    }

    #[tokio::test(start_paused = true)]
    async fn completed_cycle_records_history() {
        let mut h = Harness::new(&["Storm closes ports"]);

        let outcome = h.generate("LT", LanguageChoice::Auto).await;

        let Outcome::Completed(entry) = outcome else {
            panic!("expected completion, got {outcome:?}");
        };
        assert_eq!(entry.title, "Storm closes ports");
        assert_eq!(entry.country, "LT");
        assert_eq!(entry.poem_language, "lt");
        assert_eq!(h.library.history_len(), 1);
        assert_eq!(h.poet.requests(), [("Storm closes ports".to_string(), "lt".to_string())]);

        let events = h.drain();
        assert_eq!(events.first(), Some(&PipelineEvent::Busy(true)));
        assert_eq!(events.last(), Some(&PipelineEvent::Busy(false)));
        assert!(events.contains(&PipelineEvent::HeadlineText("Storm closes ports".into())));
        assert!(events.contains(&PipelineEvent::PoemText(entry.poem.clone())));
        assert!(events.contains(&PipelineEvent::Recorded {
            entry,
            favorited: false
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn second_call_inside_cooldown_is_a_noop() {
        let mut h = Harness::new(&["a"]);

        assert!(matches!(h.generate("US", LanguageChoice::Auto).await, Outcome::Completed(_)));
        h.drain();
        let outcome = h.generate("US", LanguageChoice::Auto).await;

        assert_eq!(outcome, Outcome::Rejected);
        assert!(h.drain().is_empty(), "no state change");
        assert_eq!(h.headlines.fetches(), 1);
        assert_eq!(h.poet.requests().len(), 1);
        assert_eq!(h.library.history_len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_cycle_blocks_next_call_past_cooldown() {
        let mut h = Harness::build(
            &["a"],
            ScriptedPoet::slow(COOLDOWN + Duration::from_secs(3)),
            COOLDOWN,
        );

        let later = async {
            tokio::time::sleep(COOLDOWN + Duration::from_secs(1)).await;
            h.generate("LT", LanguageChoice::Auto).await
        };
        let (first, second) = tokio::join!(h.generate("US", LanguageChoice::Auto), later);

        assert!(matches!(first, Outcome::Completed(_)));
        assert_eq!(second, Outcome::Rejected);
        assert_eq!(h.headlines.requests(), [(Category::General, "US".to_string())]);
        assert_eq!(h.library.history_len(), 1);

        let events = h.drain();
        let busy: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::Busy(_)))
            .collect();
        assert_eq!(busy, [&PipelineEvent::Busy(true), &PipelineEvent::Busy(false)]);

        // The in-flight mark is gone once the cycle ends.
        assert!(matches!(
            h.generate("LT", LanguageChoice::Auto).await,
            Outcome::Completed(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn call_during_reveal_is_rejected_without_cooldown() {
        let h = Harness::build(&["a"], ScriptedPoet::default(), Duration::ZERO);

        let reveal = h
            .generator
            .animator
            .reveal(|_| {}, "a long line of text", POEM_DELAY);
        let attempt = async {
            tokio::time::sleep(POEM_DELAY * 2).await;
            h.generate("US", LanguageChoice::Auto).await
        };
        let ((), outcome) = tokio::join!(reveal, attempt);

        assert_eq!(outcome, Outcome::Rejected);
        assert_eq!(h.headlines.fetches(), 0);

        // Nothing else holds it back once the reveal is done.
        assert!(matches!(
            h.generate("US", LanguageChoice::Auto).await,
            Outcome::Completed(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn call_after_cooldown_runs() {
        let h = Harness::new(&["a"]);

        h.generate("US", LanguageChoice::Auto).await;
        tokio::time::advance(COOLDOWN).await;
        let outcome = h.generate("US", LanguageChoice::Explicit("de".into())).await;

        let Outcome::Completed(entry) = outcome else {
            panic!("expected completion, got {outcome:?}");
        };
        assert_eq!(entry.poem_language, "de");
        assert_eq!(h.poet.requests().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn poem_failure_leaves_history_untouched() {
        let mut h = Harness::new(&["a"]);
        h.poet.push(Err(PoemError::Empty));

        let outcome = h.generate("US", LanguageChoice::Auto).await;

        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(h.library.history_len(), 0);
        let events = h.drain();
        let last_poem = events.iter().rev().find_map(|e| match e {
            PipelineEvent::PoemText(text) => Some(text.as_str()),
            _ => None,
        });
        assert_eq!(last_poem, Some(POEM_FAILED));
        assert!(events.contains(&PipelineEvent::Toast(POEM_FAILED_TOAST.into())));
        assert_eq!(events.last(), Some(&PipelineEvent::Busy(false)));
    }

    #[tokio::test(start_paused = true)]
    async fn blank_poem_counts_as_failure() {
        let h = Harness::new(&["a"]);
        h.poet.push(Ok("  \n ".into()));

        assert_eq!(h.generate("US", LanguageChoice::Auto).await, Outcome::Failed);
        assert_eq!(h.library.history_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_pool_reports_no_headlines_and_keeps_cooldown() {
        let mut h = Harness::new(&[]);

        assert_eq!(h.generate("US", LanguageChoice::Auto).await, Outcome::NoHeadlines);
        let events = h.drain();
        assert!(events.contains(&PipelineEvent::HeadlineText(NO_HEADLINES.into())));
        assert_eq!(events.last(), Some(&PipelineEvent::Busy(false)));
        assert!(h.poet.requests().is_empty());

        assert_eq!(h.generate("US", LanguageChoice::Auto).await, Outcome::Rejected);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_failure_with_empty_cache_is_no_headlines() {
        let h = Harness::new(&["a"]);
        h.headlines.fail_next(true);

        assert_eq!(h.generate("US", LanguageChoice::Auto).await, Outcome::NoHeadlines);
    }

    #[tokio::test(start_paused = true)]
    async fn reports_existing_favorite() {
        let mut h = Harness::new(&["a"]);
        let poem = "old pond\na frog leaps in\nwater's sound";
        let favorite = GeneratedEntry::new(
            &Headline::new("a", "Example News", "https://example.com/a"),
            poem,
            Utc::now(),
            "US",
            Category::General,
            "en",
        );
        h.library.add_favorite(favorite);

        h.generate("US", LanguageChoice::Auto).await;

        assert!(h.drain().iter().any(|e| matches!(e, PipelineEvent::Recorded { favorited: true, .. })));
    }

    #[test]
    fn pick_from_empty_pool_is_none() {
        assert_eq!(pick(&[]), None);
        let only = Headline::new("t", "s", "u");
        assert_eq!(pick(std::slice::from_ref(&only)), Some(only));
    }
}
