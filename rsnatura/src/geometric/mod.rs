pub mod crs;
pub mod scale_bar;
pub mod selection;
pub mod symbology;
pub mod zone;
