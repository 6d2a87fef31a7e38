pub mod process_commands;
