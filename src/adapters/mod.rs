//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter          | Implements      | Connects to                    |
//! |------------------|-----------------|--------------------------------|
//! | `config_file`    | ConfigPort      | JSON config file               |
//! | `line_transport` | CommandPort     | `topic payload` lines (stdout) |
//! |                  | (ingest)        | `topic payload` lines (stdin)  |
//! | `log_sink`       | EventSink       | `log` records                  |
//! | `status_file`    |                 | status/alarm JSON file         |
//! | `time_feed`      | TimeFeedPort    | simulation time file           |
//! | `topics`         |                 | topic naming and routing       |

pub mod config_file;
pub mod line_transport;
pub mod log_sink;
pub mod status_file;
pub mod time_feed;
pub mod topics;
