pub mod command_list;
