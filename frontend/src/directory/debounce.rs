//! Trailing-edge debounce over a stream of values.
//!
//! Every new value restarts the quiet period; a value is emitted only once
//! `delay_ms` passes with nothing newer arriving. There is no leading edge
//! and no max-wait ceiling. This is the only place the directory waits on
//! purpose.

use futures::stream::{self, Stream, StreamExt};
use futures::{FutureExt, select};
use std::future::Future;

enum Step<T> {
    Newer(T),
    Elapsed,
    Closed,
}

/// Debounce `input`, waiting with `sleep` (`zoon::Timer::sleep` in the
/// browser, a tokio sleep in tests).
///
/// A value still pending when `input` ends is flushed immediately.
pub fn debounce<S, Sleep, SleepFut>(
    input: S,
    delay_ms: u32,
    sleep: Sleep,
) -> impl Stream<Item = S::Item>
where
    S: Stream,
    Sleep: Fn(u32) -> SleepFut,
    SleepFut: Future<Output = ()>,
{
    let input = Box::pin(input.fuse());
    stream::unfold((input, sleep), move |(mut input, sleep)| async move {
        let Some(mut pending) = input.next().await else {
            return None;
        };
        loop {
            let step = select! {
                newer = input.next() => match newer {
                    Some(value) => Step::Newer(value),
                    None => Step::Closed,
                },
                _ = Box::pin(sleep(delay_ms)).fuse() => Step::Elapsed,
            };
            match step {
                Step::Newer(value) => pending = value,
                Step::Elapsed | Step::Closed => return Some((pending, (input, sleep))),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc::unbounded;
    use std::time::Duration;
    use tokio::time::{Instant, sleep};

    fn tokio_sleep(ms: u32) -> tokio::time::Sleep {
        sleep(Duration::from_millis(ms.into()))
    }

    fn collect_with_timestamps(
        settled: impl Stream<Item = String> + Send + 'static,
    ) -> tokio::task::JoinHandle<Vec<(String, u128)>> {
        let start = Instant::now();
        tokio::spawn(async move {
            settled
                .map(|value| (value, start.elapsed().as_millis()))
                .collect()
                .await
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_values_coalesce_into_last_one() {
        let (typed_sender, typed_stream) = unbounded::<String>();
        let emitted = collect_with_timestamps(debounce(typed_stream, 350, tokio_sleep));

        for text in ["a", "al", "ali", "alice"] {
            typed_sender.unbounded_send(text.to_string()).unwrap();
            sleep(Duration::from_millis(100)).await;
        }
        sleep(Duration::from_millis(1_000)).await;
        drop(typed_sender);

        let emitted = emitted.await.unwrap();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].0, "alice");
        // last keystroke at 300ms + 350ms quiet period
        assert!((650..=652).contains(&emitted[0].1), "emitted at {}ms", emitted[0].1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_each_emit() {
        let (typed_sender, typed_stream) = unbounded::<String>();
        let emitted = collect_with_timestamps(debounce(typed_stream, 350, tokio_sleep));

        typed_sender.unbounded_send("kim".to_string()).unwrap();
        sleep(Duration::from_millis(500)).await;
        typed_sender.unbounded_send("lee".to_string()).unwrap();
        sleep(Duration::from_millis(200)).await;
        typed_sender.unbounded_send("park".to_string()).unwrap();
        sleep(Duration::from_millis(500)).await;
        drop(typed_sender);

        let values: Vec<String> = emitted.await.unwrap().into_iter().map(|(v, _)| v).collect();
        assert_eq!(values, vec!["kim", "park"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_value_flushed_when_input_ends() {
        let (typed_sender, typed_stream) = unbounded::<String>();
        let emitted = collect_with_timestamps(debounce(typed_stream, 350, tokio_sleep));

        typed_sender.unbounded_send("choi".to_string()).unwrap();
        drop(typed_sender);

        let emitted = emitted.await.unwrap();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].0, "choi");
        assert!(emitted[0].1 < 350);
    }
}
