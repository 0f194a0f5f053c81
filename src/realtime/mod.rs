// Realtime board and notification feed (STOMP over WebSocket)

pub mod channel;
pub mod event;
pub mod frame;
pub mod state;
pub mod transport;

pub use channel::{board_destination, board_topic, notification_topic, RealtimeChannel};
pub use event::{BoardEvent, BoardEventType};
pub use state::ConnectionState;
pub use transport::{Connector, FrameSink, FrameStream, WebSocketConnector};
