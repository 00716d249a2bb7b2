use futures::{select, stream::StreamExt};
use zoon::events::Click;
use zoon::*;

use crate::dataflow::*;
use crate::error_display::{ErrorAlert, ErrorDisplay, dismiss_error_alert};

const TICK_MS: u32 = 50;

/// Auto-dismiss clock of one toast. Clicking the toast pauses it.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ToastCountdown {
    total_ms: u32,
    elapsed_ms: u32,
    paused: bool,
}

impl ToastCountdown {
    fn new(total_ms: u32) -> Self {
        Self {
            total_ms: total_ms.max(1),
            elapsed_ms: 0,
            paused: false,
        }
    }

    /// Advance by `ms` unless paused. Returns true once the time is up.
    fn tick(&mut self, ms: u32) -> bool {
        if !self.paused {
            self.elapsed_ms = self.elapsed_ms.saturating_add(ms).min(self.total_ms);
        }
        self.is_expired()
    }

    fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    fn is_expired(&self) -> bool {
        self.elapsed_ms >= self.total_ms
    }

    /// Width of the progress bar, 100 down to 0.
    fn remaining_percent(&self) -> f32 {
        100.0 - self.elapsed_ms as f32 * 100.0 / self.total_ms as f32
    }
}

/// Toast notifications container, pinned to the top right corner
pub fn toast_notifications_container(error_display: ErrorDisplay) -> impl Element {
    El::new()
        .s(Width::fill())
        .s(Align::new().top().right())
        .s(Padding::all(16))
        .update_raw_el(|raw_el| {
            raw_el
                .style("position", "fixed")
                .style("top", "0")
                .style("left", "0")
                .style("pointer-events", "none") // Allow clicks to pass through empty areas
                .style("z-index", "1000")
        })
        .child(
            Column::new()
                .s(Gap::new().y(8))
                .s(Width::exact(380))
                .s(Align::new().top().right())
                .update_raw_el(|raw_el| raw_el.style("pointer-events", "auto"))
                .items_signal_vec(error_display.active_toasts.signal_vec().map({
                    let error_display = error_display.clone();
                    move |alert| toast_element(alert, error_display.clone())
                })),
        )
}

fn toast_element(alert: ErrorAlert, error_display: ErrorDisplay) -> impl Element {
    let (toast_clicked_relay, mut toast_clicked_stream) = relay();
    let (dismiss_button_clicked_relay, mut dismiss_button_clicked_stream) = relay();
    let alert_id = alert.id.clone();

    let countdown = Actor::new(ToastCountdown::new(alert.auto_dismiss_ms), async move |state| {
        loop {
            let mut countdown = state.get();
            select! {
                _ = Timer::sleep(TICK_MS).fuse() => {
                    let expired = countdown.tick(TICK_MS);
                    state.set_neq(countdown);
                    if expired {
                        dismiss_error_alert(&alert_id, &error_display);
                        break;
                    }
                }
                clicked = toast_clicked_stream.next() => {
                    let Some(()) = clicked else { break };
                    countdown.toggle_pause();
                    state.set_neq(countdown);
                }
                dismissed = dismiss_button_clicked_stream.next() => {
                    let Some(()) = dismissed else { break };
                    dismiss_error_alert(&alert_id, &error_display);
                    break;
                }
            }
        }
    });

    Column::new()
        .s(Width::fill())
        .s(Background::new().color(hsluv!(12, 80, 96)))
        .s(Borders::all(Border::new().width(1).color(hsluv!(12, 80, 60))))
        .s(RoundedCorners::all(8))
        .s(Shadows::new([Shadow::new().color(hsluv!(0, 0, 0, 10)).y(2).blur(8)]))
        .s(Cursor::new(CursorIcon::Pointer))
        .update_raw_el({
            let technical_error = alert.technical_error.clone();
            move |raw_el| raw_el.attr("title", &format!("{technical_error}\nClick to pause or resume"))
        })
        .on_click(move || toast_clicked_relay.send(()))
        .item(
            Row::new()
                .s(Width::fill())
                .s(Padding::all(12))
                .s(Gap::new().x(8))
                .s(Align::new().center_y())
                .item(
                    Column::new()
                        .s(Width::fill())
                        .s(Gap::new().y(4))
                        .item(
                            El::new()
                                .s(Font::new().size(16).weight(FontWeight::SemiBold).color(hsluv!(12, 80, 30)))
                                .child(&alert.title),
                        )
                        .item(
                            El::new()
                                .s(Font::new().size(14).color(hsluv!(12, 60, 35)).wrap_anywhere())
                                .child(&alert.message),
                        ),
                )
                .item(
                    El::new()
                        .s(Font::new().size(14).color(hsluv!(12, 60, 35)))
                        .s(Cursor::new(CursorIcon::Pointer))
                        .s(Padding::all(4))
                        .child("✕")
                        .update_raw_el(move |raw_el| {
                            raw_el.event_handler(move |event: Click| {
                                event.stop_propagation();
                                dismiss_button_clicked_relay.send(());
                            })
                        }),
                ),
        )
        .item(
            El::new()
                .s(Width::fill())
                .s(Height::exact(3))
                .s(Background::new().color(hsluv!(12, 80, 85)))
                .child(
                    El::new()
                        .s(Height::fill())
                        .s(Width::percent_signal(
                            countdown.signal_ref(ToastCountdown::remaining_percent),
                        ))
                        .s(Background::new().color(hsluv!(12, 80, 60)))
                        .s(Transitions::new([Transition::property("width").duration(150)])),
                ),
        )
        .after_remove(move |_| drop(countdown))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_runs_out() {
        let mut countdown = ToastCountdown::new(200);
        assert!(!countdown.tick(TICK_MS));
        assert_eq!(countdown.remaining_percent(), 75.0);
        assert!(!countdown.tick(100));
        assert!(countdown.tick(TICK_MS));
        assert_eq!(countdown.remaining_percent(), 0.0);
    }

    #[test]
    fn test_paused_countdown_holds_its_progress() {
        let mut countdown = ToastCountdown::new(100);
        countdown.tick(TICK_MS);
        countdown.toggle_pause();
        assert!(!countdown.tick(1_000));
        assert_eq!(countdown.remaining_percent(), 50.0);

        countdown.toggle_pause();
        assert!(countdown.tick(TICK_MS));
    }
}
