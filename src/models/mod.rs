pub mod frame;
pub mod payload;
pub mod point;
pub mod state;
pub mod symbol;

pub use frame::PixelBuffer;
pub use payload::DecodedPayload;
pub use point::Point;
pub use state::{ScannerState, StateKind};
pub use symbol::{ECLevel, MaskPattern, Symbol, Version};
