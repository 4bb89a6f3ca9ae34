/// UI sizing in egui points.
pub const MAIN_DEFAULT_W: f32 = 1100.0;
pub const MAIN_DEFAULT_H: f32 = 700.0;
pub const MAIN_MIN_W: f32 = 900.0;
pub const MAIN_MIN_H: f32 = 600.0;

pub const SIDEBAR_W: f32 = 200.0;
pub const CONVERSATIONS_W: f32 = 220.0;
pub const HEADER_H: f32 = 30.0;
pub const HEADER_FONT_SIZE: f32 = 12.0;
pub const SEND_BUTTON_W: f32 = 80.0;
pub const WINDOW_BUTTON_W: f32 = 28.0;

pub const WINDOW_TITLE: &str = "Server_Client-C-app GUI";

/// Width left for the message box once the Send button is placed.
pub fn composer_width(available: f32, spacing: f32) -> f32 {
    (available - SEND_BUTTON_W - spacing).max(SEND_BUTTON_W)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ui_size_constants_are_reasonable() {
        assert!(MAIN_DEFAULT_W >= MAIN_MIN_W);
        assert!(MAIN_DEFAULT_H >= MAIN_MIN_H);
        assert!(SIDEBAR_W + CONVERSATIONS_W < MAIN_MIN_W / 2.0);
        assert!(HEADER_FONT_SIZE < HEADER_H);
    }

    #[test]
    fn composer_never_collapses() {
        assert_eq!(composer_width(10.0, 8.0), SEND_BUTTON_W);
        assert_eq!(composer_width(600.0, 8.0), 600.0 - SEND_BUTTON_W - 8.0);
    }
}
