mod common;
mod encoding;
mod interpretation;
