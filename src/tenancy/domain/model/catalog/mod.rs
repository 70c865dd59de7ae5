pub mod model_catalog;
