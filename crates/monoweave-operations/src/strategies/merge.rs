use monoweave_core::StrategyMap;

/// Union of both maps. Shared keys keep the explicit commits and changelog and
/// take the higher strategy.
#[must_use]
pub fn merge_strategies(explicit: StrategyMap, implicit: StrategyMap) -> StrategyMap {
    let mut merged = explicit;
    for (name, strategy) in implicit {
        merged
            .entry(name)
            .and_modify(|existing| {
                existing.strategy_type = existing.strategy_type.merge(strategy.strategy_type);
            })
            .or_insert(strategy);
    }
    merged
}
