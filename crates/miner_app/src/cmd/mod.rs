pub mod extract_shop_items;
pub mod mine_item_data;
pub mod mine_items;
