pub mod provider;

pub use provider::{
    ConfiguredTokenProvider, LOGIN_PATH, LoginTokenProvider, StaticTokenProvider, TokenProvider,
};
