// Platform-neutral service model and the seams each OS backend implements

pub mod service;
