pub mod songlist;
