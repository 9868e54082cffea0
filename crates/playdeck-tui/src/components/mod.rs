pub mod confirm_dialog;
pub mod detail_pane;
pub mod footer;
pub mod help_modal;
pub mod list_pane;
pub mod toast;

pub use confirm_dialog::{ConfirmDialog, ConfirmResult};
pub use detail_pane::DetailPane;
pub use help_modal::HelpModal;
pub use list_pane::ListPane;
pub use toast::{Toast, ToastManager};
