mod common;

mod intake;
