//! The page that hosts the backdrop.
//!
//! The page is a stack of full-viewport sections. It tracks the scroll
//! position to pick the active section, hides the navigation while the user
//! scrolls down, and reveals sections as they enter the viewport. None of
//! this feeds back into the backdrop: every render hands over the same three
//! color literals, parsed afresh, and the backdrop decides that nothing
//! changed.

use gradient::ColorStops;
use renderer::{HostInput, HostKey, HostView, WindowHost};
use tracing::{debug, warn};

pub const SECTIONS: [&str; 6] = ["home", "about", "experience", "projects", "skills", "contact"];

/// Backdrop colors used by the page.
pub const PAGE_COLORS: [&str; 3] = ["#951515", "#131d7c", "#1b0553"];

/// Distance below the top edge used to decide which section is active.
const ACTIVE_OFFSET: f64 = 100.0;
/// Above this scroll position the navigation is always shown.
const NAV_ALWAYS_VISIBLE: f64 = 50.0;
/// Logical pixels moved per arrow key press.
const KEY_STEP: f64 = 40.0;

#[derive(Debug, Clone)]
pub struct ScrollTracker {
    viewport_height: f64,
    scroll_y: f64,
    last_scroll_y: f64,
    active: usize,
    nav_visible: bool,
    menu_open: bool,
}

impl ScrollTracker {
    pub fn new(viewport_height: f64) -> Self {
        Self {
            viewport_height: sanitize_height(viewport_height),
            scroll_y: 0.0,
            last_scroll_y: 0.0,
            active: 0,
            nav_visible: true,
            menu_open: false,
        }
    }

    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    pub fn max_scroll(&self) -> f64 {
        self.viewport_height * (SECTIONS.len() - 1) as f64
    }

    /// Top and bottom of section `index` in page coordinates.
    pub fn section_bounds(&self, index: usize) -> (f64, f64) {
        let top = self.viewport_height * index as f64;
        (top, top + self.viewport_height)
    }

    pub fn set_viewport_height(&mut self, height: f64) {
        let height = sanitize_height(height);
        if height == self.viewport_height {
            return;
        }
        // Keep the same section in view across the resize.
        let progress = self.scroll_y / self.viewport_height;
        self.viewport_height = height;
        self.scroll_y = (progress * height).clamp(0.0, self.max_scroll());
        self.last_scroll_y = self.scroll_y;
        self.update_active();
    }

    /// Moves to `y`, clamped to the page. Returns `true` when the position changed.
    pub fn scroll_to(&mut self, y: f64) -> bool {
        let target = if y.is_finite() { y } else { self.scroll_y };
        let target = target.clamp(0.0, self.max_scroll());
        let moved = target != self.scroll_y;
        self.scroll_y = target;

        if self.scroll_y < NAV_ALWAYS_VISIBLE {
            self.nav_visible = true;
        } else if self.scroll_y > self.last_scroll_y {
            self.nav_visible = false;
            self.menu_open = false;
        } else {
            self.nav_visible = true;
        }
        self.last_scroll_y = self.scroll_y;
        self.update_active();
        moved
    }

    pub fn scroll_by(&mut self, delta: f64) -> bool {
        self.scroll_to(self.scroll_y + delta)
    }

    pub fn scroll_to_section(&mut self, index: usize) -> bool {
        let index = index.min(SECTIONS.len() - 1);
        let (top, _) = self.section_bounds(index);
        let moved = self.scroll_to(top);
        self.menu_open = false;
        moved
    }

    pub fn active_section(&self) -> &'static str {
        SECTIONS[self.active]
    }

    pub fn nav_visible(&self) -> bool {
        self.nav_visible
    }

    pub fn menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn toggle_menu(&mut self) {
        self.menu_open = !self.menu_open;
    }

    pub fn close_menu(&mut self) {
        self.menu_open = false;
    }

    /// Share of section `index` inside the viewport, in `[0, 1]`.
    pub fn intersection_ratio(&self, index: usize) -> f64 {
        let (top, bottom) = self.section_bounds(index);
        let view_top = self.scroll_y;
        let view_bottom = self.scroll_y + self.viewport_height;
        let overlap = (bottom.min(view_bottom) - top.max(view_top)).max(0.0);
        overlap / (bottom - top)
    }

    fn update_active(&mut self) {
        let probe = self.scroll_y + ACTIVE_OFFSET;
        // The active section is left unchanged when no section contains the probe.
        if let Some(index) = (0..SECTIONS.len()).find(|&index| {
            let (top, bottom) = self.section_bounds(index);
            probe >= top && probe < bottom
        }) {
            self.active = index;
        }
    }
}

fn sanitize_height(height: f64) -> f64 {
    if height.is_finite() && height >= 1.0 {
        height
    } else {
        1.0
    }
}

/// Visibility rule for content entering the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reveal {
    pub threshold: f64,
}

impl Reveal {
    pub const DEFAULT: Reveal = Reveal { threshold: 0.1 };

    /// Visible iff at least `threshold` of the element intersects the viewport.
    /// Elements hide again once they drop below it.
    pub fn is_visible(&self, intersection_ratio: f64) -> bool {
        intersection_ratio >= self.threshold
    }
}

impl Default for Reveal {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Implements the page side of the window: scroll tracking, navigation keys,
/// and the backdrop colors.
pub struct PageShell {
    colors: Vec<String>,
    tracker: ScrollTracker,
    reveal: Reveal,
    revealed: [bool; SECTIONS.len()],
    exit: bool,
}

impl PageShell {
    pub fn new(colors: Vec<String>, viewport_height: f64) -> Self {
        let mut shell = Self {
            colors,
            tracker: ScrollTracker::new(viewport_height),
            reveal: Reveal::default(),
            revealed: [false; SECTIONS.len()],
            exit: false,
        };
        shell.update_reveals();
        shell
    }

    fn update_reveals(&mut self) {
        for index in 0..SECTIONS.len() {
            let visible = self
                .reveal
                .is_visible(self.tracker.intersection_ratio(index));
            if visible != self.revealed[index] {
                debug!(section = SECTIONS[index], visible, "section visibility changed");
                self.revealed[index] = visible;
            }
        }
    }

    fn handle_key(&mut self, key: HostKey) -> bool {
        let page = self.tracker.viewport_height();
        match key {
            HostKey::Up => self.tracker.scroll_by(-KEY_STEP),
            HostKey::Down => self.tracker.scroll_by(KEY_STEP),
            HostKey::PageUp => self.tracker.scroll_by(-page),
            HostKey::PageDown => self.tracker.scroll_by(page),
            HostKey::Home => self.tracker.scroll_to(0.0),
            HostKey::End => self.tracker.scroll_to(self.tracker.max_scroll()),
            HostKey::Escape => {
                if self.tracker.menu_open() {
                    self.tracker.close_menu();
                } else {
                    self.exit = true;
                }
                true
            }
            HostKey::Character('m') | HostKey::Character('M') => {
                self.tracker.toggle_menu();
                true
            }
            HostKey::Character('q') | HostKey::Character('Q') => {
                self.exit = true;
                true
            }
            HostKey::Character(digit @ '1'..='6') => {
                let index = digit as usize - '1' as usize;
                self.tracker.scroll_to_section(index);
                true
            }
            HostKey::Character(_) => false,
        }
    }
}

#[cfg(test)]
impl PageShell {
    pub fn tracker(&self) -> &ScrollTracker {
        &self.tracker
    }

    pub fn revealed(&self) -> &[bool] {
        &self.revealed
    }
}

impl WindowHost for PageShell {
    fn handle_input(&mut self, input: HostInput) -> bool {
        let rerender = match input {
            HostInput::Resized { height, .. } => {
                self.tracker.set_viewport_height(height);
                true
            }
            HostInput::Scroll { delta_y } => {
                if self.tracker.scroll_by(delta_y) {
                    debug!(
                        scroll_y = self.tracker.scroll_y(),
                        section = self.tracker.active_section(),
                        nav_visible = self.tracker.nav_visible(),
                        "page scrolled"
                    );
                }
                true
            }
            HostInput::Key(key) => self.handle_key(key),
        };
        if rerender {
            self.update_reveals();
        }
        rerender
    }

    fn render(&mut self) -> HostView {
        let color_stops = match ColorStops::parse(&self.colors) {
            Ok(stops) => Some(stops),
            Err(err) => {
                warn!(error = %err, "page colors are invalid; using backdrop defaults");
                None
            }
        };
        let subtitle = if self.tracker.menu_open() {
            format!("{} (menu)", self.tracker.active_section())
        } else {
            self.tracker.active_section().to_string()
        };
        HostView {
            color_stops,
            subtitle: Some(subtitle),
            exit: self.exit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_colors() -> Vec<String> {
        PAGE_COLORS.iter().map(|color| color.to_string()).collect()
    }

    #[test]
    fn active_section_uses_offset_probe() {
        let mut tracker = ScrollTracker::new(800.0);
        assert_eq!(tracker.active_section(), "home");

        tracker.scroll_to(699.0);
        assert_eq!(tracker.active_section(), "home");
        tracker.scroll_to(700.0);
        assert_eq!(tracker.active_section(), "about");
        tracker.scroll_to(tracker.max_scroll());
        assert_eq!(tracker.active_section(), "contact");
    }

    #[test]
    fn navigation_hides_when_scrolling_down() {
        let mut tracker = ScrollTracker::new(800.0);
        tracker.scroll_to(30.0);
        assert!(tracker.nav_visible());

        tracker.toggle_menu();
        tracker.scroll_to(300.0);
        assert!(!tracker.nav_visible());
        assert!(!tracker.menu_open());

        tracker.scroll_to(200.0);
        assert!(tracker.nav_visible());

        tracker.scroll_to(10.0);
        assert!(tracker.nav_visible());
    }

    #[test]
    fn scroll_is_clamped_to_page() {
        let mut tracker = ScrollTracker::new(500.0);
        assert!(!tracker.scroll_by(-20.0));
        assert_eq!(tracker.scroll_y(), 0.0);
        tracker.scroll_by(1.0e9);
        assert_eq!(tracker.scroll_y(), 2500.0);
    }

    #[test]
    fn jumping_to_a_section_closes_the_menu() {
        let mut tracker = ScrollTracker::new(600.0);
        tracker.toggle_menu();
        tracker.scroll_to_section(3);
        assert_eq!(tracker.scroll_y(), 1800.0);
        assert_eq!(tracker.active_section(), "projects");
        assert!(!tracker.menu_open());
    }

    #[test]
    fn resize_keeps_section_in_view() {
        let mut tracker = ScrollTracker::new(500.0);
        tracker.scroll_to_section(2);
        tracker.set_viewport_height(1000.0);
        assert_eq!(tracker.scroll_y(), 2000.0);
        assert_eq!(tracker.active_section(), "experience");
    }

    #[test]
    fn reveal_toggles_both_ways() {
        let reveal = Reveal::default();
        assert!(!reveal.is_visible(0.05));
        assert!(reveal.is_visible(0.1));
        assert!(reveal.is_visible(1.0));

        let mut shell = PageShell::new(page_colors(), 1000.0);
        assert_eq!(shell.revealed()[..2], [true, false]);

        shell.handle_input(HostInput::Scroll { delta_y: 150.0 });
        assert_eq!(shell.revealed()[..2], [true, true]);

        shell.handle_input(HostInput::Scroll { delta_y: -100.0 });
        assert_eq!(shell.revealed()[..2], [true, false]);
    }

    #[test]
    fn every_render_hands_over_equal_stops() {
        let mut shell = PageShell::new(page_colors(), 800.0);
        let first = shell.render();
        assert!(shell.handle_input(HostInput::Scroll { delta_y: 900.0 }));
        let second = shell.render();

        assert_eq!(first.color_stops, second.color_stops);
        assert_eq!(
            first.color_stops,
            Some(ColorStops::parse(&PAGE_COLORS).unwrap())
        );
        assert_eq!(first.subtitle.as_deref(), Some("home"));
        assert_eq!(second.subtitle.as_deref(), Some("about"));
    }

    #[test]
    fn keys_drive_menu_navigation_and_exit() {
        let mut shell = PageShell::new(page_colors(), 800.0);
        assert!(shell.handle_input(HostInput::Key(HostKey::Character('m'))));
        assert_eq!(shell.render().subtitle.as_deref(), Some("home (menu)"));

        assert!(shell.handle_input(HostInput::Key(HostKey::Character('5'))));
        assert_eq!(shell.tracker().active_section(), "skills");
        assert!(!shell.tracker().menu_open());

        shell.handle_input(HostInput::Key(HostKey::Character('m')));
        shell.handle_input(HostInput::Key(HostKey::Escape));
        assert!(!shell.render().exit);

        assert!(!shell.handle_input(HostInput::Key(HostKey::Character('z'))));
        shell.handle_input(HostInput::Key(HostKey::Escape));
        assert!(shell.render().exit);
    }

    #[test]
    fn invalid_colors_fall_back_to_defaults() {
        let mut shell = PageShell::new(vec!["#zzz".into(), "#000".into(), "#fff".into()], 800.0);
        assert_eq!(shell.render().color_stops, None);
    }
}
