//! Two-handle range slider, used for the y-axis domain.
//!
//! `RangeSlider` is the state (bounds, handles, step); `RangeSliderView`
//! draws it as a one-line track with the selected span highlighted.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;

use pricelens_core::chart::YDomain;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    Low,
    High,
}

/// Range `[low, high]` within `[min, max]`. Handles stay at least one step
/// apart, so the range always forms a valid domain.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSlider {
    min: f64,
    max: f64,
    step: f64,
    low: f64,
    high: f64,
    pub active: Handle,
}

impl RangeSlider {
    pub fn new(max: f64, domain: YDomain) -> Self {
        let max = max.max(1.0);
        let step = (max / 400.0).max(0.01);
        let mut slider = Self {
            min: 0.0,
            max,
            step,
            low: 0.0,
            high: max,
            active: Handle::Low,
        };
        slider.set(domain.min(), domain.max());
        slider
    }

    /// Move both handles, clamped to the bounds and kept a step apart.
    pub fn set(&mut self, low: f64, high: f64) {
        self.high = high.clamp(self.min + self.step, self.max);
        self.low = low.clamp(self.min, self.high - self.step);
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn toggle_handle(&mut self) {
        self.active = match self.active {
            Handle::Low => Handle::High,
            Handle::High => Handle::Low,
        };
    }

    /// Move the active handle by `steps` steps. The other handle does not
    /// move; the active one stops a step short of it.
    pub fn nudge(&mut self, steps: i32) {
        let delta = f64::from(steps) * self.step;
        match self.active {
            Handle::Low => {
                self.low = (self.low + delta).clamp(self.min, self.high - self.step);
            }
            Handle::High => {
                self.high = (self.high + delta).clamp(self.low + self.step, self.max);
            }
        }
    }

    pub fn domain(&self) -> YDomain {
        YDomain::new(self.low, self.high).unwrap_or_default()
    }

    /// Column of `value` on a track `width` cells wide.
    fn column(&self, value: f64, width: u16) -> u16 {
        if width <= 1 {
            return 0;
        }
        let frac = (value - self.min) / (self.max - self.min);
        (frac * f64::from(width - 1)).round().clamp(0.0, f64::from(width - 1)) as u16
    }
}

pub struct RangeSliderView<'a> {
    slider: &'a RangeSlider,
    track: Style,
    span: Style,
    handle: Style,
    active_handle: Style,
}

impl<'a> RangeSliderView<'a> {
    pub fn new(slider: &'a RangeSlider) -> Self {
        Self {
            slider,
            track: Style::default(),
            span: Style::default(),
            handle: Style::default(),
            active_handle: Style::default(),
        }
    }

    pub fn track_style(mut self, style: Style) -> Self {
        self.track = style;
        self
    }

    pub fn span_style(mut self, style: Style) -> Self {
        self.span = style;
        self
    }

    pub fn handle_style(mut self, style: Style) -> Self {
        self.handle = style;
        self
    }

    pub fn active_handle_style(mut self, style: Style) -> Self {
        self.active_handle = style;
        self
    }
}

impl Widget for RangeSliderView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let lo = self.slider.column(self.slider.low, area.width);
        let hi = self.slider.column(self.slider.high, area.width);

        for x in 0..area.width {
            let (symbol, style) = if x > lo && x < hi {
                ("━", self.span)
            } else {
                ("─", self.track)
            };
            buf[(area.x + x, area.y)].set_symbol(symbol).set_style(style);
        }

        for (x, handle) in [(lo, Handle::Low), (hi, Handle::High)] {
            let style = if handle == self.slider.active {
                self.active_handle
            } else {
                self.handle
            };
            buf[(area.x + x, area.y)].set_symbol("●").set_style(style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slider() -> RangeSlider {
        RangeSlider::new(4000.0, YDomain::default())
    }

    #[test]
    fn starts_at_configured_domain() {
        let s = slider();
        assert_eq!(s.low(), 0.0);
        assert_eq!(s.high(), 500.0);
        assert_eq!(s.step(), 10.0);
    }

    #[test]
    fn handles_never_cross() {
        let mut s = slider();
        s.nudge(1000);
        assert_eq!(s.low(), 490.0);
        s.toggle_handle();
        s.nudge(-1000);
        assert_eq!(s.high(), 500.0);
        assert!(s.domain().min() < s.domain().max());
    }

    #[test]
    fn high_handle_stops_at_bound() {
        let mut s = slider();
        s.active = Handle::High;
        s.nudge(10_000);
        assert_eq!(s.high(), 4000.0);
    }

    #[test]
    fn draws_handles_on_the_track() {
        let s = slider();
        let area = Rect::new(0, 0, 41, 1);
        let mut buf = Buffer::empty(area);
        RangeSliderView::new(&s).render(area, &mut buf);
        assert_eq!(buf[(0, 0)].symbol(), "●");
        assert_eq!(buf[(5, 0)].symbol(), "●");
        assert_eq!(buf[(3, 0)].symbol(), "━");
        assert_eq!(buf[(40, 0)].symbol(), "─");
    }

    proptest::proptest! {
        #[test]
        fn any_nudge_sequence_keeps_a_valid_domain(
            moves in proptest::collection::vec((proptest::bool::ANY, -500i32..500), 0..40),
        ) {
            let mut s = slider();
            for (switch, steps) in moves {
                if switch {
                    s.toggle_handle();
                }
                s.nudge(steps);
                proptest::prop_assert!(s.low() >= 0.0);
                proptest::prop_assert!(s.high() <= s.max());
                proptest::prop_assert!(s.high() - s.low() >= s.step() - 1e-9);
            }
        }
    }
}
