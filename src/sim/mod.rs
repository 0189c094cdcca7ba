pub mod clock;
pub mod engine;
pub mod event;
pub mod leaderboard;
pub mod level;
pub mod run;
pub mod save;
pub mod step;
pub mod trace;
