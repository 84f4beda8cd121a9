message! {
    /// Acknowledges that the receiver processed a command.
    pub struct CommandAck = CommandAck {
        pub command_id: u32,
        /// Running count of commands processed
        pub command_count: u32,
    }
}
