pub mod beep;
pub mod brick;
pub mod disconnect;
pub mod group;
pub mod login;
pub mod motd;
pub mod name;
pub mod open;
pub mod pass;
pub mod personal;
pub mod topic;
pub mod who;

pub fn not_signed_on(nick: &str) -> String {
    format!("{} not signed on.", nick)
}
