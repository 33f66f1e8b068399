
mod membership;
mod routing;
