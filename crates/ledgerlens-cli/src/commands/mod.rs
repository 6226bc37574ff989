//! Command implementations.

pub mod ask;
pub mod delete;
pub mod list;
pub mod process;
pub mod serve;
pub mod upload;
pub mod view;

pub use self::ask::execute_ask;
pub use self::delete::execute_delete;
pub use self::list::execute_list;
pub use self::process::execute_process;
pub use self::serve::execute_serve;
pub use self::upload::execute_upload;
pub use self::view::execute_view;
