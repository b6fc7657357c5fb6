pub(crate) mod date;
pub(crate) mod timezone;

pub(crate) use date::parse_year_month;
pub(crate) use timezone::Timezone;
