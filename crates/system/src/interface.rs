use sysgraph_config::NetworkConfig;
use sysgraph_core::state::InterfaceCounters;

/// Pick the interface whose traffic is plotted this tick.
///
/// With `config.interface` set, that interface is used whenever it is present
/// and up.  Otherwise the first interface in OS order that is up, not
/// loopback, has an address, and whose lowercased name contains one of
/// `config.patterns` wins.  No state is kept between calls.
pub fn select_active<'a>(
    interfaces: &'a [InterfaceCounters],
    config: &NetworkConfig,
) -> Option<&'a InterfaceCounters> {
    if let Some(pinned) = &config.interface {
        return interfaces
            .iter()
            .find(|i| i.name == *pinned && i.is_up);
    }

    interfaces
        .iter()
        .filter(|i| i.is_up && !i.is_loopback && i.has_address)
        .find(|i| {
            let name = i.name.to_lowercase();
            config
                .patterns
                .iter()
                .any(|p| name.contains(&p.to_lowercase()))
        })
}
