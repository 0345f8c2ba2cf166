//! UI Components
//!
//! One component per dashboard view, plus the shared widgets they use.

mod charts;
mod chat_panel;
mod cnae_autocomplete;
mod cnpj_lookup;
mod companies_table;
mod confirm_button;
mod market_view;
mod opportunity_board;
mod pagination;
mod select;
mod sidebar;

pub use chat_panel::ChatPanel;
pub use cnpj_lookup::CnpjLookup;
pub use companies_table::CompaniesTable;
pub use market_view::MarketView;
pub use opportunity_board::OpportunityBoard;
pub use sidebar::Sidebar;
