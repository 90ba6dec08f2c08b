pub mod flag_vis3d;
pub mod headless;
