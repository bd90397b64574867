//! Bundled signatures for widely deployed contract standards.
//!
//! Covers ERC-20, ERC-721, ERC-1155, ERC-4626, Ownable, WETH and the Uniswap
//! V2/V3 routers and pools. Loaded under the source label `"builtin"`.
//!
//! ERC-721 functions are all here, but its `Transfer` and `Approval` events
//! are not decodable from this table. They share canonical text with the
//! ERC-20 events, and a catalog keeps one record per canonical text, so the
//! ERC-20 layout (value not indexed) is the one bundled. A four-topic ERC-721
//! `Transfer` log therefore resolves as
//! [`DecodeOutcome::MatchedButMalformed`](crate::DecodeOutcome) with a
//! [`DecodeError::TopicCount`](chainsig_core::DecodeError) rejection, not as
//! a corrupt payload. Callers that index NFTs should treat that rejection as
//! "ERC-721 layout" and decode the token id from `topics[3]`.

use chainsig_core::SignatureKind;

use crate::catalog::Catalog;

pub const SOURCE: &str = "builtin";

pub const FUNCTIONS: &[&str] = &[
    // ERC-20
    "totalSupply()",
    "balanceOf(address account)",
    "transfer(address to, uint256 amount)",
    "allowance(address owner, address spender)",
    "approve(address spender, uint256 amount)",
    "transferFrom(address from, address to, uint256 amount)",
    "name()",
    "symbol()",
    "decimals()",
    "increaseAllowance(address spender, uint256 addedValue)",
    "decreaseAllowance(address spender, uint256 subtractedValue)",
    "mint(address to, uint256 amount)",
    "burn(uint256 amount)",
    "burnFrom(address account, uint256 amount)",
    "permit(address owner, address spender, uint256 value, uint256 deadline, uint8 v, bytes32 r, bytes32 s)",
    "nonces(address owner)",
    "DOMAIN_SEPARATOR()",
    // ERC-721
    "ownerOf(uint256 tokenId)",
    "safeTransferFrom(address from, address to, uint256 tokenId)",
    "safeTransferFrom(address from, address to, uint256 tokenId, bytes data)",
    "setApprovalForAll(address operator, bool approved)",
    "getApproved(uint256 tokenId)",
    "isApprovedForAll(address owner, address operator)",
    "tokenURI(uint256 tokenId)",
    "supportsInterface(bytes4 interfaceId)",
    // ERC-1155
    "balanceOf(address account, uint256 id)",
    "balanceOfBatch(address[] accounts, uint256[] ids)",
    "safeTransferFrom(address from, address to, uint256 id, uint256 amount, bytes data)",
    "safeBatchTransferFrom(address from, address to, uint256[] ids, uint256[] amounts, bytes data)",
    "uri(uint256 id)",
    // ERC-4626
    "asset()",
    "totalAssets()",
    "convertToShares(uint256 assets)",
    "convertToAssets(uint256 shares)",
    "deposit(uint256 assets, address receiver)",
    "mint(uint256 shares, address receiver)",
    "withdraw(uint256 assets, address receiver, address owner)",
    "redeem(uint256 shares, address receiver, address owner)",
    "maxDeposit(address receiver)",
    "previewDeposit(uint256 assets)",
    "previewRedeem(uint256 shares)",
    // Ownable
    "owner()",
    "transferOwnership(address newOwner)",
    "renounceOwnership()",
    // WETH
    "deposit()",
    "withdraw(uint256 wad)",
    // Uniswap V2
    "swapExactTokensForTokens(uint256 amountIn, uint256 amountOutMin, address[] path, address to, uint256 deadline)",
    "swapTokensForExactTokens(uint256 amountOut, uint256 amountInMax, address[] path, address to, uint256 deadline)",
    "swapExactETHForTokens(uint256 amountOutMin, address[] path, address to, uint256 deadline)",
    "swapExactTokensForETH(uint256 amountIn, uint256 amountOutMin, address[] path, address to, uint256 deadline)",
    "addLiquidity(address tokenA, address tokenB, uint256 amountADesired, uint256 amountBDesired, uint256 amountAMin, uint256 amountBMin, address to, uint256 deadline)",
    "removeLiquidity(address tokenA, address tokenB, uint256 liquidity, uint256 amountAMin, uint256 amountBMin, address to, uint256 deadline)",
    "getReserves()",
    "swap(uint256 amount0Out, uint256 amount1Out, address to, bytes data)",
    // Uniswap V3
    "exactInputSingle((address tokenIn, address tokenOut, uint24 fee, address recipient, uint256 deadline, uint256 amountIn, uint256 amountOutMinimum, uint160 sqrtPriceLimitX96) params)",
    "exactInput((bytes path, address recipient, uint256 deadline, uint256 amountIn, uint256 amountOutMinimum) params)",
    "exactOutputSingle((address tokenIn, address tokenOut, uint24 fee, address recipient, uint256 deadline, uint256 amountOut, uint256 amountInMaximum, uint160 sqrtPriceLimitX96) params)",
    "multicall(bytes[] data)",
    "multicall(uint256 deadline, bytes[] data)",
    "swap(address recipient, bool zeroForOne, int256 amountSpecified, uint160 sqrtPriceLimitX96, bytes data)",
    "slot0()",
];

pub const EVENTS: &[&str] = &[
    // ERC-20. ERC-721 Transfer/Approval share this canonical text but index
    // the third argument; see the module docs.
    "Transfer(address indexed from, address indexed to, uint256 value)",
    "Approval(address indexed owner, address indexed spender, uint256 value)",
    "ApprovalForAll(address indexed owner, address indexed operator, bool approved)",
    // ERC-1155
    "TransferSingle(address indexed operator, address indexed from, address indexed to, uint256 id, uint256 value)",
    "TransferBatch(address indexed operator, address indexed from, address indexed to, uint256[] ids, uint256[] values)",
    "URI(string value, uint256 indexed id)",
    // ERC-4626
    "Deposit(address indexed sender, address indexed owner, uint256 assets, uint256 shares)",
    "Withdraw(address indexed sender, address indexed receiver, address indexed owner, uint256 assets, uint256 shares)",
    // Ownable
    "OwnershipTransferred(address indexed previousOwner, address indexed newOwner)",
    // WETH
    "Deposit(address indexed dst, uint256 wad)",
    "Withdrawal(address indexed src, uint256 wad)",
    // Uniswap V2
    "Swap(address indexed sender, uint256 amount0In, uint256 amount1In, uint256 amount0Out, uint256 amount1Out, address indexed to)",
    "Sync(uint112 reserve0, uint112 reserve1)",
    "Mint(address indexed sender, uint256 amount0, uint256 amount1)",
    "Burn(address indexed sender, uint256 amount0, uint256 amount1, address indexed to)",
    "PairCreated(address indexed token0, address indexed token1, address pair, uint256)",
    // Uniswap V3
    "Swap(address indexed sender, address indexed recipient, int256 amount0, int256 amount1, uint160 sqrtPriceX96, uint128 liquidity, int24 tick)",
    "Initialize(uint160 sqrtPriceX96, int24 tick)",
];

/// A fresh catalog holding every bundled signature.
pub fn catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog.ingest(SignatureKind::Function, SOURCE, FUNCTIONS);
    catalog.ingest(SignatureKind::Event, SOURCE, EVENTS);
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_bundled_signature_parses() {
        let mut catalog = Catalog::new();
        let functions = catalog.ingest(SignatureKind::Function, SOURCE, FUNCTIONS);
        let events = catalog.ingest(SignatureKind::Event, SOURCE, EVENTS);
        assert!(functions.is_clean(), "{:?}", functions.rejected);
        assert!(events.is_clean(), "{:?}", events.rejected);
        assert_eq!(functions.duplicates + events.duplicates, 0);
    }

    #[test]
    fn well_known_selectors() {
        let catalog = catalog();
        let selector = |kind, sig: &str| catalog.get(kind, sig).unwrap().selector().to_hex();
        assert_eq!(selector(SignatureKind::Function, "balanceOf(address)"), "0x70a08231");
        assert_eq!(selector(SignatureKind::Function, "transferFrom(address,address,uint256)"), "0x23b872dd");
        assert_eq!(
            selector(
                SignatureKind::Function,
                "exactInputSingle((address,address,uint24,address,uint256,uint256,uint256,uint160))"
            ),
            "0x414bf389"
        );
        assert_eq!(
            selector(SignatureKind::Event, "Approval(address,address,uint256)"),
            "0x8c5be1e5ebec7d5bd14f71427d1e84f3dd0314c0f7b2291e5b200ac8c7c3b925"
        );
    }
}
