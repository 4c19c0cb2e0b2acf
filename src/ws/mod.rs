pub mod roomid;
pub mod padroom;
pub mod padregistry;
pub mod padsaver;
pub mod padhub;
pub mod connctx;
