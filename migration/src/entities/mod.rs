pub mod paste;
pub mod short_url;
pub mod terminal_command;
pub mod terminal_session;
pub mod user;

pub use paste::Entity as PasteEntity;
pub use short_url::Entity as ShortUrlEntity;
pub use terminal_command::Entity as TerminalCommandEntity;
pub use terminal_session::Entity as TerminalSessionEntity;
pub use user::Entity as UserEntity;
