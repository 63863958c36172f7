//! Custom assertion macros and utilities
//!
//! Provides assertion macros for session frames with descriptive failure
//! messages. Binary frames are 2 MB, so they are never printed whole.

/// Assert that a result is ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $message:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $message, e),
        }
    };
}

/// Assert that a frame is a text frame with exactly this content
#[macro_export]
macro_rules! assert_text_frame {
    ($frame:expr, $expected:expr) => {
        match $frame {
            Some(gridcast::backend::session::Frame::Text(text)) => {
                assert_eq!(text, $expected, "unexpected text frame")
            }
            Some(gridcast::backend::session::Frame::Binary(bytes)) => {
                panic!("Expected text frame, got binary frame of {} bytes", bytes.len())
            }
            other => panic!("Expected text frame, got {:?}", other),
        }
    };
}

/// Assert that an update JSON frame carries this (row, col, value)
#[macro_export]
macro_rules! assert_update_frame {
    ($frame:expr, $row:expr, $col:expr, $value:expr) => {
        match $frame {
            Some(gridcast::backend::session::Frame::Text(text)) => {
                let update: gridcast::shared::UpdateMessage =
                    serde_json::from_str(&text).expect("update frame is not valid JSON");
                assert_eq!(
                    update,
                    gridcast::shared::UpdateMessage::new($row, $col, $value),
                    "unexpected update in frame {}",
                    text
                );
            }
            Some(gridcast::backend::session::Frame::Binary(bytes)) => {
                panic!("Expected update frame, got binary frame of {} bytes", bytes.len())
            }
            other => panic!("Expected update frame, got {:?}", other),
        }
    };
}

/// Assert that a string contains a substring
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {{
        let haystack = $haystack;
        let needle = $needle;
        assert!(
            haystack.contains(needle),
            "Expected '{}' to contain '{}'",
            haystack,
            needle
        );
    }};
}
