pub mod color;
pub mod geometry;
pub mod image;
pub mod page;
pub mod text;
pub mod theme;

pub use color::Color;
pub use geometry::{Rect, Size};
pub use image::ImageFormat;
pub use page::{Margins, PageSize};
pub use text::to_win_ansi;
pub use theme::{ColorOverrides, SemanticRole, Theme};
