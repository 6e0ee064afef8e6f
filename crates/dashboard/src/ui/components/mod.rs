pub mod hints;
pub mod modal;
pub mod pager;
pub mod tabs;
pub mod toast;
